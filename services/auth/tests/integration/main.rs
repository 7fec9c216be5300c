mod helpers;
mod password_test;
mod register_test;
