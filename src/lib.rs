//! This "library" build is here as a hack for loading unit tests to run on local arch, without
//! depending on any hardware-related stuff. (main.rs and usb.rs are inherently hardware-related.)

#![cfg_attr(not(test), no_std)]

#[allow(dead_code, unused_imports)]
mod host;
#[allow(dead_code, unused_imports)]
mod keycode;
#[allow(dead_code, unused_imports)]
mod keymap;
#[allow(dead_code, unused_imports)]
mod leader;
#[allow(dead_code, unused_imports)]
mod macros;
#[allow(dead_code, unused_imports)]
mod scan;
#[allow(dead_code, unused_imports)]
mod unicode;
