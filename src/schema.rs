/// Column-name constants for the coffee sample table.
/// Single source of truth - exported to Python via PyO3.

// ── Sample index ────────────────────────────────────────────────────────────
pub mod sample {
    pub const SAMPLE_ID: &str = "Sample ID";
}

// ── Temperature columns ─────────────────────────────────────────────────────
pub mod temperature {
    pub const MAX: &str = "Max Temperature (°C)";
    pub const MIN: &str = "Min Temperature (°C)";
    pub const MEAN: &str = "Mean Temperature (°C)";
    pub const PIXELS_ABOVE_40: &str = "% Pixels Above 40°C";
}

// ── Particulate matter columns ──────────────────────────────────────────────
pub mod particulate {
    pub const PREFIX: &str = "PM";
    pub const PM1_0: &str = "PM1.0";
    pub const PM2_5: &str = "PM2.5";
    pub const PM10: &str = "PM10";
}

// ── Color columns (canonical) ───────────────────────────────────────────────
pub mod color {
    pub const MEAN_RED: &str = "Mean_Red";
    pub const MEAN_GREEN: &str = "Mean_Green";
    pub const MEAN_BLUE: &str = "Mean_Blue";
    pub const MEAN_H: &str = "Mean_H";
    pub const MEAN_S: &str = "Mean_S";
    pub const A_STAR: &str = "a*";
    pub const B_STAR: &str = "b*";

    pub const RGB: [&str; 3] = [MEAN_RED, MEAN_GREEN, MEAN_BLUE];
}

// ── Legacy → canonical renames ──────────────────────────────────────────────
pub mod legacy {
    use super::color;

    /// Older acquisition scripts wrote these names; everything downstream
    /// reads the canonical ones.
    pub const RENAMES: [(&str, &str); 7] = [
        ("mean_H", color::MEAN_H),
        ("mean_S", color::MEAN_S),
        ("mean_a", color::A_STAR),
        ("mean_b", color::B_STAR),
        ("dom_R", color::MEAN_RED),
        ("dom_G", color::MEAN_GREEN),
        ("dom_B", color::MEAN_BLUE),
    ];

    pub fn canonical(name: &str) -> Option<&'static str> {
        RENAMES
            .iter()
            .find(|(legacy, _)| *legacy == name)
            .map(|(_, canonical)| *canonical)
    }
}

// ── Metric categories ───────────────────────────────────────────────────────

/// A named group of metrics, matched by substring on the column name.
/// A column can fall into several categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricCategory {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
}

impl MetricCategory {
    pub fn matches(&self, column: &str) -> bool {
        self.patterns.iter().any(|p| column.contains(p))
    }
}

pub const TEMPERATURE: MetricCategory = MetricCategory {
    name: "Temperature",
    patterns: &["Temperature", "°C"],
};

pub const PARTICULATE_MATTER: MetricCategory = MetricCategory {
    name: "Particulate Matter",
    patterns: &["PM"],
};

pub const PARTICLE_SIZE: MetricCategory = MetricCategory {
    name: "Particle Size",
    patterns: &["Particle", "µm", "um"],
};

pub const COLOR: MetricCategory = MetricCategory {
    name: "Color",
    patterns: &["Red", "Green", "Blue", "Mean_H", "Mean_S", "a*", "b*", "L*"],
};

pub const WEIGHT: MetricCategory = MetricCategory {
    name: "Weight",
    patterns: &["Weight", "Value"],
};

pub const CATEGORIES: [MetricCategory; 5] =
    [TEMPERATURE, PARTICULATE_MATTER, PARTICLE_SIZE, COLOR, WEIGHT];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_lookup() {
        assert_eq!(legacy::canonical("dom_R"), Some(color::MEAN_RED));
        assert_eq!(legacy::canonical("mean_a"), Some("a*"));
        assert_eq!(legacy::canonical("Mean_Red"), None);
    }

    #[test]
    fn categories_overlap() {
        // "Mean Temperature (°C)" matches both temperature patterns but
        // nothing in color.
        assert!(TEMPERATURE.matches(temperature::MEAN));
        assert!(!COLOR.matches(temperature::MEAN));
        assert!(PARTICULATE_MATTER.matches(particulate::PM2_5));
        // no exclusivity: a weight-of-red column lands in both
        assert!(COLOR.matches("Red Weight"));
        assert!(WEIGHT.matches("Red Weight"));
    }
}
