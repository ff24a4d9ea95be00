use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Site-investment category a location is scored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Pv,
    Storage,
    Charging,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::Pv, Product::Storage, Product::Charging];

    pub fn key(&self) -> &'static str {
        match self {
            Product::Pv => "pv",
            Product::Storage => "storage",
            Product::Charging => "charging",
        }
    }

    /// Sheet title used by generated workbooks.
    pub fn sheet_title(&self) -> &'static str {
        match self {
            Product::Pv => "PV",
            Product::Storage => "Storage",
            Product::Charging => "Charging",
        }
    }

    /// Resolve a workbook sheet name to a product by keyword.
    pub fn from_sheet_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_lowercase();
        if lowered.contains("pv") || lowered.contains("photovoltaik") {
            Some(Product::Pv)
        } else if lowered.contains("storage") || lowered.contains("speicher") {
            Some(Product::Storage)
        } else if lowered.contains("charging")
            || lowered.contains("laden")
            || lowered.contains("ladeinfrastruktur")
        {
            Some(Product::Charging)
        } else {
            None
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Product {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pv" => Ok(Product::Pv),
            "storage" => Ok(Product::Storage),
            "charging" => Ok(Product::Charging),
            _ => Err(SchemaError::UnknownProduct(value.trim().to_string())),
        }
    }
}

/// Which registry of factor definitions is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVariant {
    /// Five numeric site factors per product, weights summing to 1.0.
    #[default]
    Standard,
    /// Standard factors plus company ownership, revenue, headcount and industry.
    Extended,
}

impl SchemaVariant {
    pub fn label(&self) -> &'static str {
        match self {
            SchemaVariant::Standard => "standard",
            SchemaVariant::Extended => "extended",
        }
    }
}

impl FromStr for SchemaVariant {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" | "simple" => Ok(SchemaVariant::Standard),
            "extended" | "full" => Ok(SchemaVariant::Extended),
            other => Err(SchemaError::UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Numeric,
    Boolean,
    Categorical,
}

/// Shape of the desirability curve for a numeric factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimalPolicy {
    Higher,
    /// Values up to `acceptable_max` are fully desirable when it is set.
    Lower { acceptable_max: Option<f64> },
    Target { value: f64 },
    Range { min: f64, max: f64 },
}

impl OptimalPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            OptimalPolicy::Higher => "higher",
            OptimalPolicy::Lower { .. } => "lower",
            OptimalPolicy::Target { .. } => "target",
            OptimalPolicy::Range { .. } => "range",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
    pub policy: OptimalPolicy,
    pub step: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactorKind {
    Numeric(NumericBounds),
    Boolean,
    Categorical { options: &'static [&'static str] },
}

/// One scoring input of a product schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
    pub kind: FactorKind,
    pub weight: f64,
}

impl FactorDefinition {
    pub fn value_type(&self) -> ValueType {
        match self.kind {
            FactorKind::Numeric(_) => ValueType::Numeric,
            FactorKind::Boolean => ValueType::Boolean,
            FactorKind::Categorical { .. } => ValueType::Categorical,
        }
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidFactor {
            key: self.key.to_string(),
            reason: reason.to_string(),
        };

        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(invalid("weight must be a non-negative number"));
        }

        if let FactorKind::Numeric(bounds) = self.kind {
            if !(bounds.min < bounds.max) {
                return Err(invalid("min must be below max"));
            }
            match bounds.policy {
                OptimalPolicy::Higher => {}
                OptimalPolicy::Lower { acceptable_max } => {
                    if let Some(limit) = acceptable_max {
                        if limit < bounds.min || limit > bounds.max {
                            return Err(invalid("acceptable maximum outside bounds"));
                        }
                    }
                }
                OptimalPolicy::Target { value } => {
                    if value < bounds.min || value > bounds.max {
                        return Err(invalid("target value outside bounds"));
                    }
                }
                OptimalPolicy::Range { min, max } => {
                    if !(bounds.min <= min && min <= max && max <= bounds.max) {
                        return Err(invalid("optimal range outside bounds"));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Serialize for FactorDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("label", self.label)?;
        map.serialize_entry("unit", self.unit)?;
        map.serialize_entry("description", self.description)?;
        map.serialize_entry("type", &self.value_type())?;
        match self.kind {
            FactorKind::Numeric(bounds) => {
                map.serialize_entry("min", &bounds.min)?;
                map.serialize_entry("max", &bounds.max)?;
                map.serialize_entry("optimal", bounds.policy.label())?;
                match bounds.policy {
                    OptimalPolicy::Higher => {}
                    OptimalPolicy::Lower { acceptable_max } => {
                        if let Some(limit) = acceptable_max {
                            map.serialize_entry("optimal_max", &limit)?;
                        }
                    }
                    OptimalPolicy::Target { value } => {
                        map.serialize_entry("optimal_value", &value)?;
                    }
                    OptimalPolicy::Range { min, max } => {
                        map.serialize_entry("optimal_min", &min)?;
                        map.serialize_entry("optimal_max", &max)?;
                    }
                }
                if let Some(step) = bounds.step {
                    map.serialize_entry("step", &step)?;
                }
            }
            FactorKind::Boolean => {
                map.serialize_entry("options", &BOOLEAN_OPTIONS)?;
            }
            FactorKind::Categorical { options } => {
                map.serialize_entry("options", options)?;
            }
        }
        map.serialize_entry("weight", &self.weight)?;
        map.end()
    }
}

/// Ordered factor definitions for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSchema {
    pub product: Product,
    pub factors: Vec<FactorDefinition>,
}

impl ProductSchema {
    pub fn factor(&self, key: &str) -> Option<&FactorDefinition> {
        self.factors.iter().find(|factor| factor.key == key)
    }

    pub fn total_weight(&self) -> f64 {
        self.factors.iter().map(|factor| factor.weight).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factors.iter().map(|factor| factor.key)
    }
}

impl Serialize for ProductSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.factors.len()))?;
        for factor in &self.factors {
            map.serialize_entry(factor.key, factor)?;
        }
        map.end()
    }
}

/// Immutable set of product schemas for one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRegistry {
    variant: SchemaVariant,
    schemas: Vec<ProductSchema>,
}

impl SchemaRegistry {
    /// Shared registry for the variant, built on first use.
    pub fn get(variant: SchemaVariant) -> &'static SchemaRegistry {
        static STANDARD: OnceLock<SchemaRegistry> = OnceLock::new();
        static EXTENDED: OnceLock<SchemaRegistry> = OnceLock::new();

        match variant {
            SchemaVariant::Standard => STANDARD.get_or_init(Self::standard),
            SchemaVariant::Extended => EXTENDED.get_or_init(Self::extended),
        }
    }

    pub fn standard() -> Self {
        Self {
            variant: SchemaVariant::Standard,
            schemas: vec![
                ProductSchema {
                    product: Product::Pv,
                    factors: PV_FACTORS.to_vec(),
                },
                ProductSchema {
                    product: Product::Storage,
                    factors: STORAGE_FACTORS.to_vec(),
                },
                ProductSchema {
                    product: Product::Charging,
                    factors: CHARGING_FACTORS.to_vec(),
                },
            ],
        }
    }

    pub fn extended() -> Self {
        let with_common = |product: Product, specific: &[FactorDefinition], weights: [f64; 5]| {
            let mut factors = COMMON_FACTORS.to_vec();
            factors.extend(
                specific
                    .iter()
                    .zip(weights)
                    .map(|(factor, weight)| FactorDefinition { weight, ..*factor }),
            );
            ProductSchema { product, factors }
        };

        Self {
            variant: SchemaVariant::Extended,
            schemas: vec![
                with_common(Product::Pv, PV_FACTORS, [0.20, 0.15, 0.15, 0.10, 0.10]),
                with_common(
                    Product::Storage,
                    STORAGE_FACTORS,
                    [0.20, 0.20, 0.15, 0.10, 0.10],
                ),
                with_common(
                    Product::Charging,
                    CHARGING_FACTORS,
                    [0.20, 0.20, 0.10, 0.10, 0.10],
                ),
            ],
        }
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    pub fn schema(&self, product: Product) -> &ProductSchema {
        // Every constructor registers all three products in `Product::ALL` order.
        let index = Product::ALL
            .iter()
            .position(|candidate| *candidate == product)
            .unwrap_or_default();
        &self.schemas[index]
    }

    /// Look up a schema by its product name, case-insensitively.
    pub fn schema_by_name(&self, name: &str) -> Result<&ProductSchema, SchemaError> {
        name.parse::<Product>().map(|product| self.schema(product))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &ProductSchema> {
        self.schemas.iter()
    }

    /// Factor keys across all products, first occurrence order.
    pub fn all_factor_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Vec::new();
        for schema in &self.schemas {
            for key in schema.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        for schema in &self.schemas {
            for factor in &schema.factors {
                factor.validate()?;
            }
        }
        Ok(())
    }

    /// Products whose weights do not sum to 1.0, with their totals.
    pub fn weight_drift(&self) -> Vec<(Product, f64)> {
        self.schemas
            .iter()
            .map(|schema| (schema.product, schema.total_weight()))
            .filter(|(_, total)| (total - 1.0).abs() > WEIGHT_TOLERANCE)
            .collect()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaError {
    #[error("Produkt '{0}' nicht gefunden")]
    UnknownProduct(String),
    #[error("unknown schema variant '{0}' (expected standard or extended)")]
    UnknownVariant(String),
    #[error("factor '{key}' is misconfigured: {reason}")]
    InvalidFactor { key: String, reason: String },
}

const WEIGHT_TOLERANCE: f64 = 1e-6;

const BOOLEAN_OPTIONS: [&str; 2] = ["Ja", "Nein"];

pub const INDUSTRIES: &[&str] = &[
    "Energie & Versorgung",
    "Produktion & Fertigung",
    "Logistik & Transport",
    "Einzelhandel & Handel",
    "Gastronomie & Hotellerie",
    "Büro & Verwaltung",
    "Gesundheitswesen",
    "Bildung & Forschung",
    "Immobilien & Bau",
    "IT & Telekommunikation",
    "Automobil & Mobilität",
    "Chemie & Pharma",
    "Lebensmittel & Getränke",
    "Textil & Mode",
    "Maschinenbau",
    "Elektronik & Elektrotechnik",
    "Landwirtschaft",
    "Sonstige",
];

const fn higher(min: f64, max: f64) -> FactorKind {
    FactorKind::Numeric(NumericBounds {
        min,
        max,
        policy: OptimalPolicy::Higher,
        step: None,
    })
}

const ELECTRICITY_PRICE: FactorDefinition = FactorDefinition {
    key: "electricity_price_eur",
    label: "Strompreis",
    unit: "€/kWh",
    description: "Lokaler Strompreis (höher = mehr Einsparung)",
    kind: higher(0.20, 0.50),
    weight: 0.15,
};

const COMMON_FACTORS: &[FactorDefinition] = &[
    FactorDefinition {
        key: "eigentuemer",
        label: "Eigentümer",
        unit: "",
        description: "Ist der Standort im Eigentum des Unternehmens?",
        kind: FactorKind::Boolean,
        weight: 0.10,
    },
    FactorDefinition {
        key: "umsatz",
        label: "Umsatz",
        unit: "×10k €/Jahr",
        description: "Jährlicher Umsatz des Unternehmens (in 10.000 € Schritten)",
        kind: FactorKind::Numeric(NumericBounds {
            min: 10.0,
            max: 10_000.0,
            policy: OptimalPolicy::Higher,
            step: Some(10.0),
        }),
        weight: 0.10,
    },
    FactorDefinition {
        key: "mitarbeiterzahl",
        label: "Mitarbeiterzahl",
        unit: "Personen",
        description: "Anzahl der Mitarbeiter am Standort",
        kind: higher(1.0, 10_000.0),
        weight: 0.10,
    },
    FactorDefinition {
        key: "branche",
        label: "Branche",
        unit: "",
        description: "Branche des Unternehmens",
        kind: FactorKind::Categorical {
            options: INDUSTRIES,
        },
        weight: 0.10,
    },
];

const PV_FACTORS: &[FactorDefinition] = &[
    FactorDefinition {
        key: "roof_area_sqm",
        label: "Dachfläche",
        unit: "m²",
        description: "Verfügbare Dachfläche für PV-Module",
        kind: higher(50.0, 5_000.0),
        weight: 0.30,
    },
    FactorDefinition {
        key: "solar_irradiation",
        label: "Sonneneinstrahlung",
        unit: "kWh/m²/Jahr",
        description: "Jährliche Globalstrahlung am Standort",
        kind: higher(800.0, 1_300.0),
        weight: 0.25,
    },
    FactorDefinition {
        key: "roof_orientation_degrees",
        label: "Dachausrichtung",
        unit: "Grad (0=Nord, 180=Süd)",
        description: "Ausrichtung des Dachs (Süd ist optimal)",
        kind: FactorKind::Numeric(NumericBounds {
            min: 0.0,
            max: 360.0,
            policy: OptimalPolicy::Target { value: 180.0 },
            step: None,
        }),
        weight: 0.20,
    },
    FactorDefinition {
        key: "roof_tilt_degrees",
        label: "Dachneigung",
        unit: "Grad",
        description: "Neigung des Dachs (30-35° optimal)",
        kind: FactorKind::Numeric(NumericBounds {
            min: 0.0,
            max: 90.0,
            policy: OptimalPolicy::Range {
                min: 25.0,
                max: 40.0,
            },
            step: None,
        }),
        weight: 0.10,
    },
    ELECTRICITY_PRICE,
];

const STORAGE_FACTORS: &[FactorDefinition] = &[
    FactorDefinition {
        key: "existing_pv_kwp",
        label: "Vorhandene PV-Leistung",
        unit: "kWp",
        description: "Installierte PV-Leistung am Standort",
        kind: higher(0.0, 500.0),
        weight: 0.25,
    },
    FactorDefinition {
        key: "annual_consumption_kwh",
        label: "Jährlicher Stromverbrauch",
        unit: "kWh/Jahr",
        description: "Jährlicher Gesamtstromverbrauch",
        kind: higher(1_000.0, 500_000.0),
        weight: 0.25,
    },
    FactorDefinition {
        key: "peak_load_kw",
        label: "Spitzenlast",
        unit: "kW",
        description: "Maximale gleichzeitige Leistungsaufnahme",
        kind: higher(10.0, 500.0),
        weight: 0.20,
    },
    FactorDefinition {
        key: "grid_connection_kw",
        label: "Netzanschlussleistung",
        unit: "kW",
        description: "Verfügbare Netzanschlusskapazität",
        kind: higher(10.0, 500.0),
        weight: 0.15,
    },
    ELECTRICITY_PRICE,
];

const CHARGING_FACTORS: &[FactorDefinition] = &[
    FactorDefinition {
        key: "parking_spaces",
        label: "Anzahl Parkplätze",
        unit: "Stück",
        description: "Verfügbare Parkplätze für Ladestationen",
        kind: higher(5.0, 500.0),
        weight: 0.30,
    },
    FactorDefinition {
        key: "daily_traffic_volume",
        label: "Tägliches Verkehrsaufkommen",
        unit: "Fahrzeuge/Tag",
        description: "Durchschnittliche Anzahl Fahrzeuge pro Tag",
        kind: higher(50.0, 10_000.0),
        weight: 0.25,
    },
    FactorDefinition {
        key: "avg_parking_duration_min",
        label: "Durchschnittliche Parkdauer",
        unit: "Minuten",
        description: "Mittlere Verweildauer (länger = mehr Ladezeit)",
        kind: higher(15.0, 480.0),
        weight: 0.15,
    },
    FactorDefinition {
        key: "grid_connection_kw",
        label: "Netzanschlussleistung",
        unit: "kW",
        description: "Verfügbare Netzanschlusskapazität",
        kind: higher(20.0, 1_000.0),
        weight: 0.15,
    },
    FactorDefinition {
        key: "ev_density_percent",
        label: "E-Auto-Dichte",
        unit: "%",
        description: "Anteil E-Fahrzeuge in der Region",
        kind: higher(0.0, 30.0),
        weight: 0.15,
    },
];
