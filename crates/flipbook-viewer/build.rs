use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const PDFIUM_RELEASE: &str = "chromium/7543";

fn main() {
    println!("cargo:rerun-if-env-changed=FLIPBOOK_PDFIUM_DIR");
    println!("cargo:rerun-if-env-changed=FLIPBOOK_SKIP_PDFIUM_DOWNLOAD");

    if env::var("CARGO_FEATURE_PDF_VIEWER").is_err() {
        return;
    }

    let target = env::var("TARGET").unwrap();
    let Some(platform) = Platform::for_target(&target) else {
        println!("cargo:warning=No prebuilt PDFium for {}; using the system library", target);
        return;
    };

    // An explicit directory wins over the vendored copy
    let pdfium_dir = match env::var("FLIPBOOK_PDFIUM_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => workspace_root().join("vendor").join("pdfium"),
    };
    let lib_dir = pdfium_dir.join("lib");
    let lib_path = lib_dir.join(platform.lib_name);

    // Runtime lookup path for init_pdfium()
    println!("cargo:rustc-env=FLIPBOOK_PDFIUM_LIB_DIR={}", lib_dir.display());
    println!("cargo:rerun-if-changed={}", lib_dir.display());

    if lib_path.exists() {
        fix_install_name(&lib_path, &platform);
        return;
    }

    if env::var("FLIPBOOK_SKIP_PDFIUM_DOWNLOAD").is_ok() {
        println!("cargo:warning=PDFium download skipped; pages render only with a system PDFium");
        return;
    }

    let url = format!(
        "https://github.com/bblanchon/pdfium-binaries/releases/download/{}/pdfium-{}-{}.tgz",
        PDFIUM_RELEASE, platform.os, platform.arch
    );
    println!("cargo:warning=Downloading PDFium from {}", url);

    fs::create_dir_all(&lib_dir).expect("Failed to create PDFium lib directory");
    let archive_name = format!("flipbook-pdfium-{}-{}.tgz", platform.os, platform.arch);
    let archive = env::temp_dir().join(archive_name);
    download(&url, &archive);
    unpack(&archive, &pdfium_dir);
    let _ = fs::remove_file(&archive);

    if !lib_path.exists() {
        panic!("PDFium archive did not contain {}", lib_path.display());
    }
    fix_install_name(&lib_path, &platform);
}

struct Platform {
    os: &'static str,
    arch: &'static str,
    lib_name: &'static str,
}

impl Platform {
    fn for_target(target: &str) -> Option<Self> {
        let arm = target.contains("aarch64");
        if target.contains("wasm32") {
            None
        } else if target.contains("apple") {
            Some(Self {
                os: "mac",
                arch: if arm { "arm64" } else { "x64" },
                lib_name: "libpdfium.dylib",
            })
        } else if target.contains("linux") {
            Some(Self {
                os: "linux",
                arch: if arm { "arm64" } else { "x64" },
                lib_name: "libpdfium.so",
            })
        } else if target.contains("windows") {
            let arch = if arm {
                "arm64"
            } else if target.contains("i686") {
                "x86"
            } else {
                "x64"
            };
            Some(Self {
                os: "win",
                arch,
                lib_name: "pdfium.dll",
            })
        } else {
            None
        }
    }
}

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    manifest_dir
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .expect("Failed to find workspace root")
}

fn download(url: &str, dest: &Path) {
    let response = ureq::get(url)
        .call()
        .unwrap_or_else(|e| panic!("Failed to download {}: {}", url, e));

    let mut file = fs::File::create(dest).expect("Failed to create download file");
    std::io::copy(&mut response.into_reader(), &mut file).expect("Failed to write download");
}

fn unpack(archive: &Path, dest: &Path) {
    let file = fs::File::open(archive).expect("Failed to open PDFium archive");
    tar::Archive::new(flate2::read::GzDecoder::new(file))
        .unpack(dest)
        .expect("Failed to extract PDFium archive");
}

/// macOS dylibs must advertise an @rpath install name to load from the vendor dir
fn fix_install_name(lib_path: &Path, platform: &Platform) {
    if platform.os != "mac" {
        return;
    }
    match std::process::Command::new("install_name_tool")
        .arg("-id")
        .arg("@rpath/libpdfium.dylib")
        .arg(lib_path)
        .output()
    {
        Ok(out) if out.status.success() => {}
        Ok(out) => println!(
            "cargo:warning=install_name_tool failed: {}",
            String::from_utf8_lossy(&out.stderr)
        ),
        Err(e) => println!("cargo:warning=install_name_tool not available: {}", e),
    }
}
