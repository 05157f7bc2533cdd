mod snippet_tests;
mod support;
mod worker_tests;
