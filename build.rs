use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto, ServiceDescriptorProto,
};

fn lib_version(cargo_lock: &str, lib: &str) -> String {
    let name_line = format!("name = \"{lib}\"");
    cargo_lock
        .lines()
        .collect::<Vec<_>>()
        .windows(3)
        .find(|window| window[0].trim() == "[[package]]" && window[1].trim() == name_line)
        .and_then(|window| {
            window[2]
                .trim()
                .strip_prefix("version = ")
                .map(|v| v.trim_matches('"').to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn field(name: &str, number: i32, kind: Type, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(kind as i32),
        type_name: type_name.map(str::to_string),
        json_name: Some(name.to_string()),
        ..Default::default()
    }
}

// Mirrors proto/voting.proto; served by the reflection service.
fn voting_descriptor_set() -> FileDescriptorSet {
    let vote_enum = EnumDescriptorProto {
        name: Some("Vote".to_string()),
        value: [("UP", 0), ("DOWN", 1)]
            .into_iter()
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some(name.to_string()),
                number: Some(number),
                options: None,
            })
            .collect(),
        ..Default::default()
    };

    let request = DescriptorProto {
        name: Some("VotingRequest".to_string()),
        field: vec![
            field("url", 1, Type::String, None),
            field("vote", 2, Type::Enum, Some(".voting.VotingRequest.Vote")),
        ],
        enum_type: vec![vote_enum],
        ..Default::default()
    };

    let response = DescriptorProto {
        name: Some("VotingResponse".to_string()),
        field: vec![field("confirmation", 1, Type::String, None)],
        ..Default::default()
    };

    let service = ServiceDescriptorProto {
        name: Some("Voting".to_string()),
        method: vec![MethodDescriptorProto {
            name: Some("Vote".to_string()),
            input_type: Some(".voting.VotingRequest".to_string()),
            output_type: Some(".voting.VotingResponse".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };

    FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("voting.proto".to_string()),
            package: Some("voting".to_string()),
            message_type: vec![request, response],
            service: vec![service],
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }],
    }
}

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR not set"));

    println!("cargo:rerun-if-changed=Cargo.lock");
    println!("cargo:rerun-if-changed=proto/voting.proto");

    let build_time = chrono::Utc::now().to_rfc3339();
    let cargo_lock = fs::read_to_string(manifest_dir.join("Cargo.lock")).unwrap_or_default();

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rust_version = std::process::Command::new(rustc)
        .arg("--version")
        .output()
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let mut file = File::create(out_dir.join("build_info.rs")).expect("could not create build_info.rs");
    writeln!(file, "pub const BUILD_TIME: &str = \"{}\";", build_time).unwrap();
    writeln!(
        file,
        "pub const AXUM_VERSION: &str = \"axum {}\";",
        lib_version(&cargo_lock, "axum")
    )
    .unwrap();
    writeln!(
        file,
        "pub const TONIC_VERSION: &str = \"tonic {}\";",
        lib_version(&cargo_lock, "tonic")
    )
    .unwrap();
    writeln!(file, "pub const RUST_VERSION: &str = {:?};", rust_version).unwrap();

    fs::write(
        out_dir.join("voting_descriptor.bin"),
        voting_descriptor_set().encode_to_vec(),
    )
    .expect("could not write voting_descriptor.bin");
}
