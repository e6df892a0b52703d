//! Purpose: Probe for a linkable libmagic and wire it into the Rust crate.
//! Role: Cargo build-script; emits link directives and the `has_libmagic` cfg.
//! Invariants: `has_libmagic` is set only when a probe program both compiles and links.
//! Invariants: The probe needs only `magic_open`/`magic_close`; optional features are probed at run time.
//! Invariants: `MAGIC_LIB_DIR` adds a native search path for both the probe and the crate.
//! Invariants: Uses only Cargo-provided env vars plus `MAGIC_LIB_DIR`.
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const PROBE_SOURCE: &str = r#"
#include <magic.h>

int main(void) {
    magic_t cookie = magic_open(MAGIC_NONE);
    magic_close(cookie);
    return 0;
}
"#;

fn main() {
    let target = env::var("TARGET").unwrap_or_default();
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    let lib_dir = env::var_os("MAGIC_LIB_DIR").map(PathBuf::from);

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MAGIC_LIB_DIR");
    println!("cargo:rustc-check-cfg=cfg(has_libmagic)");

    if let Some(dir) = &lib_dir {
        println!("cargo:rustc-link-search=native={}", dir.display());
    }

    match probe_libmagic(&target, &out_dir, lib_dir.as_deref()) {
        Ok(()) => {
            println!("cargo:rustc-cfg=has_libmagic");
            println!("cargo:rustc-link-lib=magic");
        }
        Err(reason) => {
            println!(
                "cargo:warning=libmagic not linkable ({reason}); the libmagic backend is disabled. \
                 Install the libmagic development package or set MAGIC_LIB_DIR."
            );
        }
    }
}

fn probe_libmagic(target: &str, out_dir: &Path, lib_dir: Option<&Path>) -> Result<(), String> {
    if target.contains("windows-msvc") {
        return Err("msvc targets are not probed".to_string());
    }

    let source = out_dir.join("magic_probe.c");
    let binary = out_dir.join("magic_probe");
    fs::write(&source, PROBE_SOURCE).map_err(|err| format!("write probe source: {err}"))?;

    let compiler = cc::Build::new()
        .cargo_metadata(false)
        .warnings(false)
        .try_get_compiler()
        .map_err(|err| format!("no C compiler: {err}"))?;

    let mut command = compiler.to_command();
    command.arg(&source).arg("-o").arg(&binary);
    if let Some(dir) = lib_dir {
        command.arg(format!("-L{}", dir.display()));
    }
    command.arg("-lmagic");

    let output = command
        .output()
        .map_err(|err| format!("spawn compiler: {err}"))?;
    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let first_line = stderr.lines().next().unwrap_or("probe failed");
        Err(first_line.to_string())
    }
}
