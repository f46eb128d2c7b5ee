use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum TileType {
	Red,
	Green,
	Blue,
	White,
	Yellow,
	Purple,
}

impl TileType {
	pub const ALL: [TileType; 6] = [
		TileType::Red,
		TileType::Green,
		TileType::Blue,
		TileType::White,
		TileType::Yellow,
		TileType::Purple,
	];

	/// One-letter glyph used by the text renderer.
	pub fn symbol(self) -> char {
		match self {
			TileType::Red => 'R',
			TileType::Green => 'G',
			TileType::Blue => 'B',
			TileType::White => 'W',
			TileType::Yellow => 'Y',
			TileType::Purple => 'P',
		}
	}
}

/// Stable handle of a tile inside the board arena. Never reused within one setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TileId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Tile {
	pub id: TileId,
	pub kind: TileType,
}

impl fmt::Display for Tile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Tile #{} ({:?})", self.id.0, self.kind)
	}
}

/// Source of tile types for board setup.
pub trait TypeSampler {
	/// Pick one entry of `palette`. Callers guarantee the palette is non-empty.
	fn pick(&mut self, palette: &[TileType]) -> TileType;
}

/// Uniform sampler over the palette.
#[derive(Debug, Clone)]
pub struct RandomSampler {
	rng: StdRng,
}

impl RandomSampler {
	pub fn seeded(seed: u64) -> Self {
		Self { rng: StdRng::seed_from_u64(seed) }
	}

	pub fn from_entropy() -> Self {
		Self { rng: StdRng::from_entropy() }
	}
}

impl TypeSampler for RandomSampler {
	fn pick(&mut self, palette: &[TileType]) -> TileType {
		palette[self.rng.gen_range(0..palette.len())]
	}
}

/// Replays a fixed sequence of types, wrapping around at the end.
/// Entries missing from the palette are still returned as-is.
#[derive(Debug, Clone)]
pub struct ScriptedSampler {
	script: Vec<TileType>,
	cursor: usize,
}

impl ScriptedSampler {
	pub fn new(script: Vec<TileType>) -> Self {
		Self { script, cursor: 0 }
	}
}

impl TypeSampler for ScriptedSampler {
	fn pick(&mut self, palette: &[TileType]) -> TileType {
		if self.script.is_empty() {
			return palette[0];
		}
		let kind = self.script[self.cursor % self.script.len()];
		self.cursor += 1;
		kind
	}
}
