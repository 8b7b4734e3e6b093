use std::env;
use std::path::PathBuf;

// ffmpeg-sys-next locates FFmpeg on its own everywhere except Windows,
// where a vcpkg install is only found if FFMPEG_DIR points at it.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows"
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!("cargo:warning=stillshot: FFMPEG_DIR is not set; install FFmpeg via vcpkg and set VCPKG_ROOT or FFMPEG_DIR.");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.exists() {
        println!(
            "cargo:warning=stillshot: found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to pin it.",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=stillshot: VCPKG_ROOT is set but {} does not exist.",
            candidate.display()
        );
    }
}
