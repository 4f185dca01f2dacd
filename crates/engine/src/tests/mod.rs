mod helpers;
mod projection_tests;
