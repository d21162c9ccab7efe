use nodewar_shared::Team;

/// Canvas background.
pub const BACKGROUND: &str = "#222222";
/// Stroke/text color for anything inside the observer's visible area.
pub const VISIBLE_INK: &str = "#eeeeee";

/// Fixed team palette. Fogged nodes and edges are painted with the Neutral
/// color regardless of their true owner.
pub fn team_color(team: Team) -> &'static str {
    match team {
        Team::Neutral => "#444444",
        Team::Red => "#DD0000",
        Team::Blue => "#0000DD",
        Team::Green => "#00DD00",
        Team::Yellow => "#DDDD00",
        Team::Orange => "#DD7700",
        Team::Purple => "#7700DD",
    }
}
