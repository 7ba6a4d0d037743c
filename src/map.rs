use anyhow::{anyhow, Context};
use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::common::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    passable: bool,
}

impl Tile {
    pub fn is_passable(&self) -> bool {
        self.passable
    }

    fn from_char(ch: char) -> Self {
        Tile {
            passable: matches!(ch, '.' | 'G' | 'S'),
        }
    }
}

/// Static occupancy grid. Rows are indexed first, so a position is `(row, col)`.
#[derive(Debug, Clone)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    grid: Vec<Vec<Tile>>,
}

impl Map {
    /// Reads a MovingAI style map: `type`, `height`, `width`, `map` header lines
    /// followed by one line per row.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open map file {path}"))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let mut next_line = |what: &str| -> anyhow::Result<String> {
            lines
                .next()
                .ok_or_else(|| anyhow!("map file {path} ended before {what}"))?
                .map_err(Into::into)
        };

        let _type = next_line("type")?;
        let height = parse_header(&next_line("height")?, "height")?;
        let width = parse_header(&next_line("width")?, "width")?;
        let _map = next_line("map")?;

        let mut rows = Vec::with_capacity(height);
        for _ in 0..height {
            rows.push(next_line("grid rows")?);
        }

        let map = Self::from_rows(&rows)?;
        if map.width != width {
            return Err(anyhow!(
                "map file {path} declares width {width}, rows have width {}",
                map.width
            ));
        }
        Ok(map)
    }

    /// Builds a grid from row strings: `.`, `G` and `S` are free, anything else is blocked.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> anyhow::Result<Self> {
        let mut grid: Vec<Vec<Tile>> = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let tiles: Vec<Tile> = row.as_ref().trim_end().chars().map(Tile::from_char).collect();
            if let Some(first) = grid.first() {
                if first.len() != tiles.len() {
                    return Err(anyhow!(
                        "row {index} has width {}, expected {}",
                        tiles.len(),
                        first.len()
                    ));
                }
            }
            grid.push(tiles);
        }

        let height = grid.len();
        let width = grid.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(anyhow!("grid must contain at least one cell"));
        }

        Ok(Map {
            height,
            width,
            grid,
        })
    }

    pub fn is_in_bounds(&self, position: Position) -> bool {
        position.0 < self.height && position.1 < self.width
    }

    pub fn is_passable(&self, position: Position) -> bool {
        self.is_in_bounds(position) && self.grid[position.0][position.1].is_passable()
    }

    /// Free 4-connected neighbours of `position`, in up, down, left, right order.
    /// With `with_wait` the position itself is appended when it is free.
    pub fn get_neighbors(&self, position: Position, with_wait: bool) -> Vec<Position> {
        let directions: &[(isize, isize)] = if with_wait {
            &[(-1, 0), (1, 0), (0, -1), (0, 1), (0, 0)]
        } else {
            &[(-1, 0), (1, 0), (0, -1), (0, 1)]
        };

        directions
            .iter()
            .filter_map(|&(dx, dy)| {
                let x = position.0.checked_add_signed(dx)?;
                let y = position.1.checked_add_signed(dy)?;
                self.is_passable((x, y)).then_some((x, y))
            })
            .collect()
    }

    pub fn free_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height)
            .flat_map(move |x| (0..self.width).map(move |y| (x, y)))
            .filter(|&position| self.is_passable(position))
    }
}

fn parse_header(line: &str, name: &str) -> anyhow::Result<usize> {
    line.split_whitespace()
        .last()
        .ok_or_else(|| anyhow!("empty {name} header"))?
        .parse::<usize>()
        .with_context(|| format!("invalid {name} header: {line}"))
}
