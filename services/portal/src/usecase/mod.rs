pub mod booking;
pub mod login;
pub mod otp;
pub mod signup;
