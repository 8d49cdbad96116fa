use std::env;
use std::fs;
use std::path::Path;
use walkway_pathfinding::{find_map_image, LocationRegistry, RouteParams, Router};

// Routes between two campus locations and prints the waypoints as JSON.
//
// Usage:
//   cargo run --example route -- <map image or directory> <markers.json> <from> <to> [params.json]
//
// A missing or invalid markers file falls back to the built-in house locations. Locations may
// be given by name, alias or room code, e.g.
//   cargo run --example route -- images data/markers.json "te kanawa" K12
//
// Set RUST_LOG=debug to follow classification and search.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 4 {
        eprintln!("usage: route <map image or directory> <markers.json> <from> <to> [params.json]");
        std::process::exit(2);
    }
    let map_arg = Path::new(&args[0]);
    let map_path = if map_arg.is_dir() {
        find_map_image(map_arg).ok_or("no map image found in directory")?
    } else {
        map_arg.to_path_buf()
    };
    let registry = LocationRegistry::load_or_default(&args[1]);
    let params = match args.get(4) {
        Some(path) => RouteParams::from_json(&fs::read_to_string(path)?)?,
        None => RouteParams::default(),
    };

    let mut router = Router::open(&map_path, registry, params)?;
    let route = router.route(&args[2], &args[3])?;
    println!("{}", serde_json::to_string_pretty(&route)?);
    eprintln!(
        "{:?} route with {} waypoints, length {:.4}",
        route.kind,
        route.len(),
        route.length()
    );
    Ok(())
}
