//! Solution generator - a seeded walk over the digit grid.
//!
//! Two halves:
//! - [`derive_rules`] consumes the rule stream in a fixed order and binds the
//!   puzzle to the seed and to the bomb's serial number and edgework.
//! - [`generate`] is the pure walk that turns a [`WalkConfig`] into digits.

use crate::gestures::{GestureSet, POOL_SIZE};
use crate::grid::{Cell, Direction, DIGIT_BASE};
use blackhole_env::{Edgework, RuleStream, SerialNumber, DEFAULT_RULE_SEED};
use serde::{Deserialize, Serialize};

/// Where the walk starts and how it turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkConfig {
    pub start: Cell,
    pub direction: Direction,
    pub clockwise: bool,
}

/// Produces `length` digits by walking the grid.
///
/// Output `i` takes `i + 1` steps. Each step adds the current cell's value
/// to a running digit (mod 5) and moves one cell in the current direction;
/// after each output the direction turns 45°. The running digit carries
/// across outputs, so every digit depends on the whole walk before it.
pub fn generate(config: &WalkConfig, length: usize) -> Vec<u8> {
    let mut cell = config.start;
    let mut direction = config.direction;
    let mut digit = 0u8;
    let mut output = Vec::with_capacity(length);

    for i in 0..length {
        for _ in 0..=i {
            digit = (digit + cell.value()) % DIGIT_BASE;
            cell = cell.step(direction);
        }
        output.push(digit);
        direction = direction.rotated(config.clockwise);
    }

    output
}

/// Which serial-number digit feeds one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigitSource {
    First,
    Last,
    /// Sum of all serial digits, mod 10
    Sum,
}

impl DigitSource {
    fn read(self, digits: &[u8]) -> u8 {
        match self {
            DigitSource::First => digits[0],
            DigitSource::Last => digits[digits.len() - 1],
            DigitSource::Sum => (digits.iter().map(|&d| u32::from(d)).sum::<u32>() % 10) as u8,
        }
    }
}

/// `(x, y)` sources, in draw order.
pub const COORDINATE_SOURCES: [(DigitSource, DigitSource); 6] = [
    (DigitSource::First, DigitSource::Last),
    (DigitSource::Last, DigitSource::First),
    (DigitSource::First, DigitSource::Sum),
    (DigitSource::Sum, DigitSource::Last),
    (DigitSource::Last, DigitSource::Sum),
    (DigitSource::Sum, DigitSource::First),
];

/// Edgework quantity that turns the initial direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetSource {
    Batteries,
    Holders,
    Ports,
    Indicators,
    BatteriesPlusPorts,
    BatteriesPlusIndicators,
    HoldersPlusPorts,
    HoldersPlusIndicators,
    PortsPlusIndicators,
}

/// Widget sources, in draw order. Reordering this changes every seeded puzzle.
pub const WIDGET_SOURCES: [WidgetSource; 9] = [
    WidgetSource::Batteries,
    WidgetSource::Holders,
    WidgetSource::Ports,
    WidgetSource::Indicators,
    WidgetSource::BatteriesPlusPorts,
    WidgetSource::BatteriesPlusIndicators,
    WidgetSource::HoldersPlusPorts,
    WidgetSource::HoldersPlusIndicators,
    WidgetSource::PortsPlusIndicators,
];

impl WidgetSource {
    /// Reads the quantity off the bomb.
    pub fn count(self, edgework: &Edgework) -> u32 {
        let e = edgework;
        match self {
            WidgetSource::Batteries => e.batteries,
            WidgetSource::Holders => e.battery_holders,
            WidgetSource::Ports => e.ports,
            WidgetSource::Indicators => e.indicators,
            WidgetSource::BatteriesPlusPorts => e.batteries.saturating_add(e.ports),
            WidgetSource::BatteriesPlusIndicators => e.batteries.saturating_add(e.indicators),
            WidgetSource::HoldersPlusPorts => e.battery_holders.saturating_add(e.ports),
            WidgetSource::HoldersPlusIndicators => e.battery_holders.saturating_add(e.indicators),
            WidgetSource::PortsPlusIndicators => e.ports.saturating_add(e.indicators),
        }
    }
}

/// Everything derived from the rule stream for one bomb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub walk: WalkConfig,
    pub gestures: GestureSet,
    pub coordinates: (DigitSource, DigitSource),
    pub widget: WidgetSource,
    /// Pool indices, in the order they were assigned to gestures
    pub pool_order: Vec<usize>,
}

/// Derives the walk and gesture set from the rule stream and the bomb.
///
/// Draw order: decoy skips, pool shuffle, coordinate source, initial
/// direction, widget source, rotation sense. The canonical seed takes no
/// draws at all.
///
/// # Panics
/// If the serial number has fewer than two digits.
pub fn derive_rules(
    stream: &mut dyn RuleStream,
    serial: &SerialNumber,
    edgework: &Edgework,
    report_progress: bool,
) -> RuleSet {
    let digits = serial.digits();
    assert!(digits.len() >= 2, "serial {} has fewer than two digits", serial);

    let mut pool_order: Vec<usize> = (0..POOL_SIZE).collect();

    let (coordinates, drawn_direction, widget, clockwise) = if stream.seed() == DEFAULT_RULE_SEED {
        (COORDINATE_SOURCES[0], Direction::NORTH, WIDGET_SOURCES[0], true)
    } else {
        let skip = stream.next_range(0, 100);
        for _ in 0..skip {
            stream.next_fraction();
        }

        for i in (1..pool_order.len()).rev() {
            let j = stream.next_range(0, i as i32 + 1) as usize;
            pool_order.swap(i, j);
        }

        let coordinates = COORDINATE_SOURCES[draw_index(stream, COORDINATE_SOURCES.len())];
        let direction = Direction::from_index(draw_index(stream, 8) as u32);
        let widget = WIDGET_SOURCES[draw_index(stream, WIDGET_SOURCES.len())];
        let clockwise = stream.next_fraction() < 0.5;
        (coordinates, direction, widget, clockwise)
    };

    let start = Cell::new(coordinates.0.read(&digits), coordinates.1.read(&digits));
    let direction = drawn_direction.turned_clockwise(widget.count(edgework));

    RuleSet {
        walk: WalkConfig {
            start,
            direction,
            clockwise,
        },
        gestures: GestureSet::from_pool_order(&pool_order, report_progress),
        coordinates,
        widget,
        pool_order,
    }
}

fn draw_index(stream: &mut dyn RuleStream, len: usize) -> usize {
    stream.next_range(0, len as i32) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackhole_env::ChaChaRuleStream;

    fn serial(s: &str) -> SerialNumber {
        SerialNumber::parse(s).unwrap()
    }

    /// Replays a fixed list of draws.
    struct ScriptedStream {
        seed: u64,
        ranges: Vec<i32>,
        fractions: Vec<f64>,
    }

    impl RuleStream for ScriptedStream {
        fn seed(&self) -> u64 {
            self.seed
        }

        fn next_range(&mut self, min: i32, max: i32) -> i32 {
            let n = self.ranges.remove(0);
            assert!((min..max).contains(&n));
            n
        }

        fn next_fraction(&mut self) -> f64 {
            self.fractions.remove(0)
        }
    }

    #[test]
    fn test_generate_regression_baseline() {
        let config = WalkConfig {
            start: Cell::new(3, 5),
            direction: Direction::NORTH,
            clockwise: true,
        };
        assert_eq!(generate(&config, 7), vec![1, 3, 3, 2, 2, 1, 3]);
    }

    #[test]
    fn test_generate_longer_extends_prefix() {
        let config = WalkConfig {
            start: Cell::new(3, 5),
            direction: Direction::NORTH,
            clockwise: true,
        };
        let fourteen = generate(&config, 14);
        assert_eq!(&fourteen[..7], &generate(&config, 7)[..]);
        assert_eq!(fourteen, vec![1, 3, 3, 2, 2, 1, 3, 4, 4, 3, 3, 0, 3, 4]);
    }

    #[test]
    fn test_generate_rotation_sense_matters() {
        let cw = WalkConfig {
            start: Cell::new(3, 5),
            direction: Direction::NORTH,
            clockwise: true,
        };
        let ccw = WalkConfig { clockwise: false, ..cw };
        assert_eq!(generate(&ccw, 7), vec![1, 0, 3, 3, 3, 3, 0]);
        assert_ne!(generate(&cw, 7), generate(&ccw, 7));
    }

    #[test]
    fn test_generate_other_start() {
        let config = WalkConfig {
            start: Cell::new(0, 0),
            direction: Direction::EAST,
            clockwise: true,
        };
        assert_eq!(generate(&config, 7), vec![3, 0, 0, 4, 4, 4, 3]);
    }

    #[test]
    fn test_canonical_seed_takes_no_draws() {
        let mut stream = ScriptedStream {
            seed: DEFAULT_RULE_SEED,
            ranges: vec![],
            fractions: vec![],
        };
        let rules = derive_rules(&mut stream, &serial("AB3C5D"), &Edgework::default(), true);

        assert_eq!(rules.walk.start, Cell::new(3, 5));
        assert_eq!(rules.walk.direction, Direction::NORTH);
        assert!(rules.walk.clockwise);
        assert_eq!(rules.pool_order, (0..POOL_SIZE).collect::<Vec<_>>());
        assert_eq!(generate(&rules.walk, 7), vec![1, 3, 3, 2, 2, 1, 3]);
    }

    #[test]
    fn test_canonical_seed_reads_batteries() {
        let mut stream = ChaChaRuleStream::new(DEFAULT_RULE_SEED);
        let edgework = Edgework::new(4, 4, 3, 2);
        let rules = derive_rules(&mut stream, &serial("AB3C5D"), &edgework, true);

        // 3 batteries turn north three steps clockwise
        assert_eq!(rules.walk.direction, Direction::SOUTH_EAST);
    }

    #[test]
    fn test_draw_order() {
        // skip 2, nine shuffle draws (identity), then coordinates, direction, widget
        let mut ranges = vec![2];
        ranges.extend((1..POOL_SIZE as i32).rev());
        ranges.extend([3, 6, 8]);
        let mut stream = ScriptedStream {
            seed: 99,
            ranges,
            fractions: vec![0.9, 0.9, 0.7],
        };
        let edgework = Edgework::new(2, 1, 0, 0);
        let rules = derive_rules(&mut stream, &serial("A1B2C9"), &edgework, true);

        // (Sum, Last): (1+2+9) % 10 = 2, last = 9
        assert_eq!(rules.walk.start, Cell::new(2, 9));
        // west + (ports + indicators = 3) = north-east
        assert_eq!(rules.walk.direction, Direction::NORTH_EAST);
        assert!(!rules.walk.clockwise);
        assert_eq!(rules.widget, WidgetSource::PortsPlusIndicators);
        assert_eq!(rules.pool_order, (0..POOL_SIZE).collect::<Vec<_>>());
        assert!(stream.ranges.is_empty());
        assert!(stream.fractions.is_empty());
    }

    #[test]
    fn test_seeded_derivation_deterministic() {
        let edgework = Edgework::new(3, 2, 4, 2);
        for seed in [0u64, 2, 42, 1000, u64::MAX] {
            let a = derive_rules(&mut ChaChaRuleStream::new(seed), &serial("KT4NE7"), &edgework, true);
            let b = derive_rules(&mut ChaChaRuleStream::new(seed), &serial("KT4NE7"), &edgework, true);
            assert_eq!(a, b);
            assert_eq!(generate(&a.walk, 21), generate(&b.walk, 21));
        }
    }

    #[test]
    fn test_seed_zero_baseline() {
        let rules = derive_rules(
            &mut ChaChaRuleStream::new(0),
            &serial("AB3C5D"),
            &Edgework::default(),
            true,
        );

        assert_eq!(rules.pool_order, vec![7, 0, 2, 3, 8, 5, 9, 4, 6, 1]);
        assert_eq!(rules.coordinates, (DigitSource::Sum, DigitSource::Last));
        assert_eq!(rules.widget, WidgetSource::BatteriesPlusPorts);
        // (3 + 5) % 10 = 8, last = 5
        assert_eq!(rules.walk.start, Cell::new(8, 5));
        assert_eq!(rules.walk.direction, Direction::EAST);
        assert!(!rules.walk.clockwise);
        assert_eq!(generate(&rules.walk, 7), vec![2, 0, 2, 4, 1, 2, 0]);
    }

    #[test]
    fn test_seed_zero_widgets_turn_start() {
        // Same draws as above; 3 batteries + 2 ports turn east five steps
        let rules = derive_rules(
            &mut ChaChaRuleStream::new(0),
            &serial("AB3C5D"),
            &Edgework::new(2, 1, 3, 2),
            true,
        );

        assert_eq!(rules.widget, WidgetSource::BatteriesPlusPorts);
        assert_eq!(rules.walk.direction, Direction::NORTH_WEST);
        assert_eq!(generate(&rules.walk, 7), vec![2, 0, 3, 1, 3, 0, 1]);
    }

    #[test]
    fn test_widget_count_saturates() {
        let edgework = Edgework::new(u32::MAX, u32::MAX, 0, 0);
        assert_eq!(WidgetSource::PortsPlusIndicators.count(&edgework), u32::MAX);
    }

    #[test]
    fn test_seeded_pool_is_permutation() {
        let rules = derive_rules(
            &mut ChaChaRuleStream::new(31337),
            &serial("AB3C5D"),
            &Edgework::default(),
            true,
        );
        let mut sorted = rules.pool_order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..POOL_SIZE).collect::<Vec<_>>());
    }

    #[test]
    fn test_widget_sources_cover_nine_quantities() {
        let edgework = Edgework::new(1, 10, 100, 1000);
        let counts: Vec<u32> = WIDGET_SOURCES.iter().map(|w| w.count(&edgework)).collect();
        assert_eq!(counts, vec![100, 1000, 1, 10, 101, 110, 1001, 1010, 11]);
    }
}
