use clap::Parser;
#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
thread_local! {
    static ENV_MAP: std::cell::RefCell<HashMap<String, String>> = std::cell::RefCell::new(HashMap::new());
}

/// Get an environment variable parsed to the desired type.
///
/// On web, variables come from `env`-prefixed GET parameters (`?envLOG_LEVEL=debug`).
#[allow(dead_code)] // Only read on web for now
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    #[cfg(target_arch = "wasm32")]
    {
        ENV_MAP.with(|map| map.borrow().get(key).and_then(|s| s.parse().ok()))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::env::var(key).ok().and_then(|s| s.parse().ok())
    }
}

/// Parses from the command line arguments on native and from GET parameters on web
/// (`?clibase-url=http://localhost:8080/` becomes `--base-url http://localhost:8080/`).
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        T::try_parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        let query = current_query();
        let (args, env) = query_to_args(env!("CARGO_PKG_NAME"), &query);
        ENV_MAP.with(|map| map.borrow_mut().extend(env));
        T::try_parse_from(args)
    }
}

/// Load `env`-prefixed GET parameters before anything reads them (web only)
#[cfg(target_arch = "wasm32")]
pub fn parse_env() {
    let (_, env) = query_to_args(env!("CARGO_PKG_NAME"), &current_query());
    ENV_MAP.with(|map| map.borrow_mut().extend(env));
}

#[cfg(target_arch = "wasm32")]
fn current_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

/// Split a query string into CLI args (from `cli*` keys) and env pairs (from `env*` keys)
#[cfg(any(target_arch = "wasm32", test))]
pub fn query_to_args(bin: &str, query: &str) -> (Vec<String>, Vec<(String, String)>) {
    let mut args = vec![bin.to_string()];
    let mut env = Vec::new();
    let query = query.split_once('?').map_or(query, |(_, q)| q);

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = percent_decode(value);
        if let Some(arg_key) = key.strip_prefix("cli") {
            if !arg_key.is_empty() {
                args.push(format!("--{arg_key}"));
            }
            if !value.is_empty() {
                args.push(value);
            }
        } else if let Some(env_key) = key.strip_prefix("env")
            && !env_key.is_empty()
        {
            env.push((env_key.to_string(), value));
        }
    }
    (args, env)
}

/// Minimal `%XX` / `+` decoding for query values
#[cfg(any(target_arch = "wasm32", test))]
fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(b) => {
                        out.push(b);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
