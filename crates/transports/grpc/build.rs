// Build script for cloudevents-grpc
// Handles protobuf code generation for the Greeter service

fn main() {
    // Use vendored protoc from protobuf-src
    std::env::set_var("PROTOC", protobuf_src::protoc());

    compile_protos();

    // Rebuild when protobuf files change
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=protos/");
}

/// Compile the CloudEvents schema and the Greeter service
fn compile_protos() {
    std::fs::create_dir_all("src/generated")
        .unwrap_or_else(|e| panic!("Failed to create src/generated: {}", e));

    // google/protobuf/{any,timestamp}.proto ship with the vendored protoc
    let includes = [std::path::PathBuf::from("protos"), protobuf_src::include()];

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir("src/generated") // Output to src/generated directory
        .compile_protos(
            &["protos/cloudevents.proto", "protos/greeter.proto"],
            &includes,
        )
        .unwrap_or_else(|e| panic!("Failed to compile protos: {}", e));
}
