//! Drawing target abstraction.
//!
//! The renderer only talks to [`Surface`]. The browser implements it over a
//! 2D canvas context; [`DrawList`] records commands and is what tests inspect.

use std::fmt;

/// An sRGB color with straight alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity.
	pub a: f64,
}

impl Rgba {
	/// Opaque white.
	pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
	/// Opaque black.
	pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

	/// Opaque color from channels.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Same color at alpha `a`, clamped to `[0, 1]`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}
}

/// CSS `rgba()` notation.
impl fmt::Display for Rgba {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
	}
}

/// Stroke pattern for lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stroke {
	/// Continuous line.
	Solid,
	/// Alternating dashes and gaps.
	Dashed {
		/// Dash length in pixels.
		dash: f64,
		/// Gap length in pixels.
		gap: f64,
		/// Pattern start offset.
		offset: f64,
	},
}

/// Immediate-mode 2D drawing target.
pub trait Surface {
	/// Paint the whole frame, `color.a < 1` keeps a trail of the previous one.
	fn clear(&mut self, width: f64, height: f64, color: Rgba);

	/// Radial falloff from `color` at the center to transparent at `radius`.
	fn glow(&mut self, x: f64, y: f64, radius: f64, color: Rgba);

	/// Solid disc.
	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba);

	/// Arc from `start` to `end` radians, clockwise from the +x axis.
	#[allow(clippy::too_many_arguments)]
	fn stroke_arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, width: f64, color: Rgba);

	/// Straight segment in one color.
	#[allow(clippy::too_many_arguments)]
	fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Rgba, stroke: Stroke);

	/// Solid segment shaded by `(offset, color)` stops along its length.
	fn gradient_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, stops: &[(f64, Rgba)]);

	/// Centered text.
	fn text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Rgba);
}

/// One recorded [`Surface`] call, fields as passed to the method.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
	Clear {
		width: f64,
		height: f64,
		color: Rgba,
	},
	Glow {
		x: f64,
		y: f64,
		radius: f64,
		color: Rgba,
	},
	FillCircle {
		x: f64,
		y: f64,
		radius: f64,
		color: Rgba,
	},
	StrokeArc {
		x: f64,
		y: f64,
		radius: f64,
		start: f64,
		end: f64,
		width: f64,
		color: Rgba,
	},
	Line {
		from: (f64, f64),
		to: (f64, f64),
		width: f64,
		color: Rgba,
		stroke: Stroke,
	},
	GradientLine {
		from: (f64, f64),
		to: (f64, f64),
		width: f64,
		stops: Vec<(f64, Rgba)>,
	},
	Text {
		text: String,
		x: f64,
		y: f64,
		size: f64,
		color: Rgba,
	},
}

/// A surface that records what was drawn.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
	/// Calls in the order they were made.
	pub commands: Vec<DrawCommand>,
}

impl DrawList {
	/// Empty recording.
	pub fn new() -> Self {
		Self::default()
	}

	/// Forget everything recorded so far.
	pub fn clear_commands(&mut self) {
		self.commands.clear();
	}

	/// Text draws in order.
	pub fn texts(&self) -> impl Iterator<Item = &str> {
		self.commands.iter().filter_map(|c| match c {
			DrawCommand::Text { text, .. } => Some(text.as_str()),
			_ => None,
		})
	}
}

impl Surface for DrawList {
	fn clear(&mut self, width: f64, height: f64, color: Rgba) {
		self.commands.push(DrawCommand::Clear {
			width,
			height,
			color,
		});
	}

	fn glow(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
		self.commands.push(DrawCommand::Glow {
			x,
			y,
			radius,
			color,
		});
	}

	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
		self.commands.push(DrawCommand::FillCircle {
			x,
			y,
			radius,
			color,
		});
	}

	fn stroke_arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, width: f64, color: Rgba) {
		self.commands.push(DrawCommand::StrokeArc {
			x,
			y,
			radius,
			start,
			end,
			width,
			color,
		});
	}

	fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Rgba, stroke: Stroke) {
		self.commands.push(DrawCommand::Line {
			from: (x1, y1),
			to: (x2, y2),
			width,
			color,
			stroke,
		});
	}

	fn gradient_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, stops: &[(f64, Rgba)]) {
		self.commands.push(DrawCommand::GradientLine {
			from: (x1, y1),
			to: (x2, y2),
			width,
			stops: stops.to_vec(),
		});
	}

	fn text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Rgba) {
		self.commands.push(DrawCommand::Text {
			text: text.to_owned(),
			x,
			y,
			size,
			color,
		});
	}
}
