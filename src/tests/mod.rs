mod import_tests;
mod utils;
