pub mod fee;
pub mod payment;
pub mod ports;
pub mod request;
