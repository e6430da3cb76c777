//! Example: Generate a town layout
//!
//! Demonstrates the full pipeline from a noise field to classified forest
//! tiles. Run with `RUST_LOG=debug` to see per-stage timings.

use std::collections::BTreeMap;

use voronoi_town::*;

fn main() {
    env_logger::init();

    println!("Voronoi Town Generation Example");
    println!("===============================\n");

    let config = TownConfigBuilder::new()
        .seed(42)
        .bound_size(600.0)
        .unwrap()
        .road_step(60.0)
        .unwrap()
        .build()
        .unwrap();

    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Map Size: {}", config.bound_size);
    println!("  Road Step: {}", config.road_step);
    println!("  Road Width: {}", config.road_width);
    println!("  Corner Radius: {}", config.corner_radius);
    println!("  Building Spacing: {:.2}", config.building_spacing());
    println!();

    println!("Generating town...");
    let field = NoiseSeedField::new(config.seed as u32);
    let layout = TownLayout::from_noise(&config, &field).expect("Failed to generate town");

    let roads = layout.roads();
    let total_length: f64 = roads.edges().iter().map(Edge::length).sum();

    println!("Statistics:");
    println!(
        "  Roads: {} ({} interior, {} touching the frame)",
        roads.len(),
        roads.interior_edges().count(),
        roads.border_edges().count()
    );
    println!("  Total road length: {:.1}", total_length);
    println!("  Buildings: {}", layout.buildings().len());
    println!("  Connectors: {}", layout.connectors().len());
    println!("  Corner wedges: {}", layout.corners().len());

    match layout.forest() {
        Ok(tiles) => {
            let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
            for tile in tiles {
                *kinds.entry(format!("{:?}", tile.tile)).or_default() += 1;
            }
            println!("  Forest tiles: {}", tiles.len());
            for (kind, count) in kinds {
                println!("    {}: {}", kind, count);
            }
        }
        Err(err) => println!("  Forest: {}", err),
    }
    println!();

    println!("Sample buildings:");
    for (site, connector) in layout.buildings().iter().zip(layout.connectors()).take(5) {
        println!(
            "  Sprite {}: position=({:.1}, {:.1}), angle={:.2}, connector={:.1}",
            site.sprite_index,
            site.position.x,
            site.position.y,
            site.angle,
            connector.length()
        );
    }

    println!("\nGeneration complete!");
}
