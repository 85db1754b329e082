//! Terminal renderer for the agent's view and plans.

use std::fmt::Write;

use crossterm::style::{Color, Stylize};

use crate::game::{Terrain, WorldState};

/// Render the world with the target and gather paths drawn over it.
///
/// Output format:
/// ```text
/// Turn 42  crown 17  cities 2  mountains 9
/// ┌─────────┐
/// │ o * * . │
/// │ ^ g X ~ │
/// └─────────┘
/// ```
///
/// Legend: `o` path origin, `*` waypoint, `X` terminus, `g` gather path,
/// `^` mountain, `#` fogged obstacle, `~` fog, `C` city, digits are armies.
#[must_use]
pub fn render_path(world: &WorldState, target: &[usize], gather: &[usize]) -> String {
    let grid = world.grid();
    let mut output = String::new();

    let crown = world
        .crown()
        .map_or_else(|| "-".to_string(), |crown| crown.to_string());
    let _ = writeln!(
        output,
        "Turn {}  crown {crown}  cities {}  mountains {}",
        world.turn(),
        world.owned_cities(),
        world.mountains().len()
    );

    let border = "─".repeat(grid.width() * 2 + 1);
    let _ = writeln!(output, "┌{border}┐");
    for row in 0..grid.height() {
        output.push_str("│ ");
        for col in 0..grid.width() {
            let tile = row * grid.width() + col;
            let _ = write!(output, "{} ", cell(world, tile, target, gather));
        }
        output.push_str("│\n");
    }
    let _ = writeln!(output, "└{border}┘");

    output
}

fn cell(world: &WorldState, tile: usize, target: &[usize], gather: &[usize]) -> String {
    if let Some(position) = target.iter().position(|&step| step == tile) {
        let glyph = if position == 0 {
            'o'
        } else if position + 1 == target.len() {
            'X'
        } else {
            '*'
        };
        return glyph.with(Color::Yellow).bold().to_string();
    }
    if gather.contains(&tile) {
        return 'g'.with(Color::Cyan).bold().to_string();
    }
    if world.is_mountain(tile) {
        return '^'.with(Color::White).to_string();
    }

    let terrain = world.terrain_at(tile);
    let glyph = match terrain {
        Terrain::FogObstacle => '#',
        Terrain::Fog => '~',
        _ if world.is_city(tile) => 'C',
        Terrain::Owned(_) => army_to_char(world.army(tile)),
        Terrain::Empty | Terrain::Mountain => '.',
    };
    let color = match terrain {
        Terrain::Owned(_) if world.is_team(tile) => Color::Green,
        Terrain::Owned(_) => Color::Red,
        Terrain::Fog | Terrain::FogObstacle => Color::DarkGrey,
        Terrain::Empty | Terrain::Mountain => Color::Grey,
    };
    glyph.with(color).to_string()
}

/// Convert army count to a display character.
fn army_to_char(army: i64) -> char {
    match army {
        i64::MIN..=0 => ' ',
        1..=9 => u32::try_from(army)
            .ok()
            .and_then(|digit| char::from_digit(digit, 10))
            .unwrap_or('9'),
        _ => '+', // More than 9
    }
}
