use cfg_aliases::cfg_aliases;
use kernelcfg_common::build::BuildScript;

fn main() {
    // Setup cfg aliases
    cfg_aliases! {
        host_stderr: { not(target_family = "wasm") },
    }

    // Binds TYPE_T, OPERATOR and KERNEL_NAME, warning about every default, and turns
    // `kernel_debug` on when requested.
    if let Err(err) = BuildScript::from_env().run() {
        panic!("Unable to write the kernel configuration: {err}");
    }
}
