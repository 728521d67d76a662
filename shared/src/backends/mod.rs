cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        compile_error!("netsync-shared only provides a native clock backend, the wasm32 target is not supported");
    } else {
        mod native;
        pub use native::timestamp::{TimeError, Timestamp};
    }
}
