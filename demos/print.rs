//! Space-filling curves in your terminal!
//!
//! Draws the 2D Hilbert curve at a few levels, then shows which tiles the
//! key ranges of a query cover. Handy to eyeball the curve layout and the
//! effect of the range decomposition policies.

use sfc_index::{
    Coord, Envelope, LongRange, PartialOverlapConfiguration, SpaceFillingCurve,
    SpaceFillingCurveConfiguration, StandardConfiguration,
};

type Coordinates2D = [Coord; 2];

/// Normalized coordinates of every key, in curve order
fn coordinates(curve: &SpaceFillingCurve) -> Vec<Coordinates2D> {
    (0..curve.value_width())
        .map(|key| {
            let coords = curve
                .normalized_coordinate_for(key)
                .expect("Every key below the value width is valid");
            [coords[0], coords[1]]
        })
        .collect()
}

/// Character grid with y pointing up
struct Display {
    width: usize,
    chars: Vec<char>,
}

impl Display {
    fn new(width: usize) -> Self {
        Self {
            width,
            // This character is a placeholder that should not persist in the
            // final program output.
            chars: vec!['@'; width * width],
        }
    }

    fn set(&mut self, [x, y]: Coordinates2D, c: char) {
        assert!(
            (x as usize) < self.width && (y as usize) < self.width,
            "Coordinates out of range: {:?} for width {}",
            [x, y],
            self.width
        );
        let row = self.width - 1 - y as usize;
        self.chars[row * self.width + x as usize] = c;
    }

    fn print(&self) {
        for row in self.chars.chunks(self.width) {
            println!("{}", row.iter().collect::<String>());
        }
        println!();
    }
}

// Display a Hilbert curve of specified level
fn print_hilbert(level: u32) {
    println!("--- At level {level} ---\n");
    let curve = SpaceFillingCurve::hilbert_2d(Envelope::rect(0.0, 1.0, 0.0, 1.0), level)
        .expect("Demo levels are valid");
    let coordinates = coordinates(&curve);
    let num_points = coordinates.len();
    let mut display = Display::new(curve.width() as usize);
    let to_dir = |src: Coordinates2D, dst: Coordinates2D| {
        [
            dst[0] as isize - src[0] as isize,
            dst[1] as isize - src[1] as isize,
        ]
    };

    // Draw the start of the curve
    let start = coordinates[0];
    display.set(
        start,
        match to_dir(start, coordinates[1]) {
            [0, 1] => '┴',
            [1, 0] => '├',
            [0, -1] => '┬',
            [-1, 0] => '┤',
            _ => unreachable!("Hilbert curve moves by single-coordinate steps"),
        },
    );

    // Draw the end of the curve
    let end = coordinates[num_points - 1];
    display.set(
        end,
        match to_dir(coordinates[num_points - 2], end) {
            [0, 1] => '^',
            [1, 0] => '>',
            [0, -1] => 'v',
            [-1, 0] => '<',
            _ => unreachable!("Hilbert curve moves by single-coordinate steps"),
        },
    );

    // Draw the middle of the curve
    for window in coordinates.windows(3) {
        let path = match (to_dir(window[0], window[1]), to_dir(window[1], window[2])) {
            ([-1, 0], [0, 1]) | ([0, -1], [1, 0]) => '└',
            ([-1, 0], [0, -1]) | ([0, 1], [1, 0]) => '┌',
            ([1, 0], [1, 0]) | ([-1, 0], [-1, 0]) => '─',
            ([1, 0], [0, 1]) | ([0, -1], [-1, 0]) => '┘',
            ([0, 1], [0, 1]) | ([0, -1], [0, -1]) => '│',
            ([1, 0], [0, -1]) | ([0, 1], [-1, 0]) => '┐',
            _ => unreachable!("Hilbert curve moves by single-coordinate steps and doesn't go back"),
        };
        display.set(window[1], path);
    }

    display.print();
}

// Display the tiles covered by the ranges of a query: '#' inside of the
// query, '+' for false positives, '.' for tiles that are not scanned
fn print_ranges(name: &str, config: &dyn SpaceFillingCurveConfiguration) {
    let curve = SpaceFillingCurve::hilbert_2d(Envelope::rect(-8.0, 8.0, -8.0, 8.0), 5)
        .expect("Demo levels are valid");
    let query = Envelope::rect(-5.3, 2.2, -3.1, 6.4);
    let ranges = curve
        .ranges_for(&query, config)
        .expect("Query has the curve's dimension");
    let scanned = ranges.iter().map(LongRange::num_keys).sum::<u64>();
    println!(
        "--- {name}: {} ranges, {scanned} of {} keys ---\n",
        ranges.len(),
        curve.value_width()
    );

    let mut display = Display::new(curve.width() as usize);
    for (key, coords) in coordinates(&curve).into_iter().enumerate() {
        let key = key as u64;
        let center = curve.center_point_for(key).expect("Key is valid");
        let c = if !ranges.iter().any(|range| range.contains(key)) {
            '.'
        } else if query.intersects(&Envelope::rect(
            center[0] - 0.25,
            center[0] + 0.25,
            center[1] - 0.25,
            center[1] + 0.25,
        )) {
            '#'
        } else {
            '+'
        };
        display.set(coords, c);
    }
    display.print();
}

fn main() {
    println!();
    for level in 1..=6 {
        print_hilbert(level);
    }
    print_ranges("standard", &StandardConfiguration::default());
    print_ranges("partial overlap", &PartialOverlapConfiguration::default());
}
