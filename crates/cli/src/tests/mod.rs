mod helpers_tests;
mod output_tests;
mod parse_tests;
