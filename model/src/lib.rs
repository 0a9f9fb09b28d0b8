/*!

This library provides the Machine custom resource definition, the typed
per-platform provider specs nested inside it, and the codec that moves a
machine's opaque provider-spec payload in and out of its typed form.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use codec::{decode, encode, TypedProviderSpec};
pub use error::{Error, Result};
pub use machine::{
    LifecycleHook, LifecycleHooks, Machine, MachineSpec, MachineStatus, ProviderSpec,
};
pub use machine_ext::MachineExt;
pub use platform::{
    AwsPlatformStatus, AzureCloudEnvironment, AzurePlatformStatus, DnsConfig, GcpPlatformStatus,
    PlatformStatus, PlatformType,
};

pub mod codec;
pub mod constants;
mod error;
mod machine;
mod machine_ext;
mod platform;
pub mod providers;
