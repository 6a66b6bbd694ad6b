//! Build script for compiling the upstream service protobuf contracts.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_files = ["proto/auth.proto", "proto/enhancement.proto"];

    for proto in &proto_files {
        println!("cargo:rerun-if-changed={}", proto);
    }

    // The build environment does not ship a system `protoc`; point prost-build
    // at the vendored binary so codegen works without a global install.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }

    tonic_build::configure()
        .build_server(false)
        .compile_protos(&proto_files, &["proto/"])?;

    Ok(())
}
