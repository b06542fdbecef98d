#![allow(clippy::indexing_slicing, clippy::exit, clippy::unwrap_used)]
fn main() {
    if std::env::var("PROFILE").unwrap_or_default() == "release" {
        println!("cargo:rustc-env=DEFMT_LOG=off");
    }
    println!("cargo:rerun-if-changed=nios-v.x");

    // Host builds (tests, docs) link against std and need no scripts.
    if std::env::var_os("CARGO_FEATURE_FIRMWARE").is_none() {
        return;
    }

    let dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    println!("cargo:rustc-link-search={dir}");

    linker_be_nice();
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    println!("cargo:rustc-link-arg-bins=-Tnios-v.x");
}

fn linker_be_nice() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        let kind = &args[1];
        let what = &args[2];

        match kind.as_str() {
            "undefined-symbol" => match what.as_str() {
                "_defmt_timestamp" | "_defmt_acquire" | "_defmt_write" => {
                    eprintln!();
                    eprintln!(
                        "💡 `defmt` not found - make sure `defmt.x` is added as a linker script and a `#[defmt::global_logger]` is linked in"
                    );
                    eprintln!();
                }
                "_stack_top" | "__bss_start" | "__bss_end" | "__global_pointer$" => {
                    eprintln!();
                    eprintln!("💡 Is the linker script `nios-v.x` missing?");
                    eprintln!();
                }
                "_critical_section_1_0_acquire" | "_critical_section_1_0_release" => {
                    eprintln!();
                    eprintln!(
                        "💡 No critical-section implementation. The firmware binary provides one; library users on other targets must bring their own."
                    );
                    eprintln!();
                }
                _ => (),
            },
            _ => {
                std::process::exit(1);
            }
        }

        std::process::exit(0);
    }

    println!(
        "cargo:rustc-link-arg-bins=--error-handling-script={}",
        std::env::current_exe().unwrap().display()
    );
}
