//! Terminal rendering for day listings and analyses.

use ansi_term::Colour;
use chrono::Duration;

use crate::{
    analysis::Analysis,
    store::entities::{BlockType, TimeBlock, SYSTEM_TYPE_ID},
    utils::time::CivilTime,
};

fn paint(block_type: &BlockType) -> ansi_term::ANSIString<'_> {
    let color = Colour::RGB(
        block_type.color.r as u8,
        block_type.color.g as u8,
        block_type.color.b as u8,
    );
    color.paint(block_type.name.as_str())
}

fn type_name(types: &[BlockType], id: i32) -> String {
    types
        .iter()
        .find(|block_type| block_type.id == id)
        .map(|block_type| paint(block_type).to_string())
        .unwrap_or_else(|| format!("type {id}"))
}

fn format_clock(t: &CivilTime) -> String {
    format!("{:02}:{:02}", t.hour, t.minute)
}

pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}

pub fn print_types(types: &[BlockType]) {
    for block_type in types {
        println!("{}\t{}", block_type.id, paint(block_type));
    }
}

pub fn print_day(blocks: &[TimeBlock], types: &[BlockType]) {
    for block in blocks {
        println!(
            "{}-{}\t{}\t{}\t{}",
            format_clock(&block.start_time),
            format_clock(&block.end_time),
            format_duration(Duration::seconds(block.duration().total_seconds())),
            type_name(types, block.block_type_id),
            block.title
        );
    }
}

pub fn print_analysis(analysis: &Analysis, types: &[BlockType]) {
    let mut sorted = types.to_vec();
    sorted.sort_by_key(|block_type| block_type.id);

    for (block_type, percentage) in sorted.iter().zip(&analysis.percentages) {
        if block_type.id == SYSTEM_TYPE_ID {
            continue;
        }
        println!("{}%\t{}", *percentage as i32, paint(block_type));
    }

    println!();

    for trend in &analysis.trends {
        if trend.time_spent.is_zero() {
            continue;
        }
        println!(
            "{:04}-{:02}-{:02}\t{}\t{}",
            trend.day.year,
            trend.day.month,
            trend.day.day,
            format_duration(Duration::seconds(trend.time_spent.total_seconds())),
            type_name(&sorted, trend.block_type_id)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formatting_matches_scale() {
        assert_eq!(format_duration(Duration::seconds(3661)), "1h1m1s");
        assert_eq!(format_duration(Duration::seconds(61)), "1m1s");
        assert_eq!(format_duration(Duration::seconds(1)), "1s");
    }
}
