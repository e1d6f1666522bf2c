mod integration;
mod support;
