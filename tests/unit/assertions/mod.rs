pub mod set_test;
pub mod window_test;
