//! Control-to-register core for the Sony IMX185 image sensor on no-std
//! platforms.
//!
//! For a host-side walkthrough, see `imx185-app/mock-host`.
#![no_std]

pub mod utils;
