use rpcwire_codec::SerializerKind;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("rpcwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let serializers = SerializerKind::ALL
        .iter()
        .map(|kind| kind.content_type())
        .collect::<Vec<_>>()
        .join(", ");

    println!("name: rpcwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("RPCWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("serializers: {serializers}");
    println!(
        "features: msgpack={}, async={}, cli=true",
        cfg!(feature = "msgpack"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
