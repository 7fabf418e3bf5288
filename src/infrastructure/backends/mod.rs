mod remote;

pub use remote::*;
