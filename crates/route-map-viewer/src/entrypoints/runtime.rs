//! Spawning background work on the platform's executor
//!
//! Native futures run on the tokio multi-threaded runtime. On web they run on
//! the JavaScript event loop, where HTTP futures are not `Send`.

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    #[cfg(feature = "profiling")]
    {
        tokio::spawn(async move {
            profiling::scope!("runtime::spawn");
            future.await
        });
    }
    #[cfg(not(feature = "profiling"))]
    {
        tokio::spawn(future);
    }
}

#[cfg(target_arch = "wasm32")]
pub fn spawn<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}
