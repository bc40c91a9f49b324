use serde::{Deserialize, Serialize};

/// Ordinal development classification. Tier one is the largest/most developed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tier {
    One,
    Two,
    Three,
}

impl Tier {
    pub fn as_u8(&self) -> u8 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
        }
    }

    /// Picks the tier-specific entry of a `[tier1, tier2, tier3]` table.
    pub fn pick<T: Copy>(&self, table: [T; 3]) -> T {
        table[(self.as_u8() - 1) as usize]
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier.as_u8()
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Tier::One),
            2 => Ok(Tier::Two),
            3 => Ok(Tier::Three),
            other => Err(format!("invalid city tier {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub state: String,
    /// Millions of residents.
    pub population: f64,
    /// (longitude, latitude)
    pub coordinates: (f64, f64),
    pub tier: Tier,
}

impl City {
    pub fn new(id: &str, name: &str, state: &str, population: f64, coordinates: (f64, f64), tier: Tier) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            state: state.to_string(),
            population,
            coordinates,
            tier,
        }
    }
}

// (id, name, state, population M, lon, lat, tier)
const REGISTRY: [(&str, &str, &str, f64, f64, f64, Tier); 37] = [
    ("1", "Mumbai", "Maharashtra", 20.4, 72.8777, 19.0760, Tier::One),
    ("2", "Delhi", "Delhi", 32.9, 77.1025, 28.7041, Tier::One),
    ("3", "Bangalore", "Karnataka", 13.6, 77.5946, 12.9716, Tier::One),
    ("4", "Hyderabad", "Telangana", 10.5, 78.4867, 17.3850, Tier::One),
    ("5", "Chennai", "Tamil Nadu", 11.0, 80.2707, 13.0827, Tier::One),
    ("6", "Kolkata", "West Bengal", 14.9, 88.3639, 22.5726, Tier::One),
    ("7", "Pune", "Maharashtra", 7.4, 73.8567, 18.5204, Tier::One),
    ("8", "Ahmedabad", "Gujarat", 8.4, 72.5714, 23.0225, Tier::One),
    ("9", "Jaipur", "Rajasthan", 3.9, 75.7873, 26.9124, Tier::Two),
    ("10", "Lucknow", "Uttar Pradesh", 3.6, 80.9462, 26.8467, Tier::Two),
    ("11", "Kochi", "Kerala", 2.1, 76.2673, 9.9312, Tier::Two),
    ("12", "Indore", "Madhya Pradesh", 3.3, 75.8577, 22.7196, Tier::Two),
    ("13", "Bhopal", "Madhya Pradesh", 2.4, 77.4126, 23.2599, Tier::Two),
    ("14", "Chandigarh", "Punjab", 1.2, 76.7794, 30.7333, Tier::Two),
    ("15", "Coimbatore", "Tamil Nadu", 2.2, 76.9558, 11.0168, Tier::Two),
    ("16", "Visakhapatnam", "Andhra Pradesh", 2.3, 83.2185, 17.6868, Tier::Two),
    ("17", "Surat", "Gujarat", 6.6, 72.8311, 21.1702, Tier::Two),
    ("18", "Kanpur", "Uttar Pradesh", 3.0, 80.3319, 26.4499, Tier::Two),
    ("19", "Nagpur", "Maharashtra", 2.6, 79.0882, 21.1458, Tier::Two),
    ("20", "Thiruvananthapuram", "Kerala", 1.7, 76.9366, 8.5241, Tier::Two),
    ("21", "Vadodara", "Gujarat", 2.1, 73.2080, 22.3072, Tier::Two),
    ("22", "Nashik", "Maharashtra", 2.0, 73.7898, 19.9975, Tier::Two),
    ("23", "Faridabad", "Haryana", 1.9, 77.3178, 28.4089, Tier::Two),
    ("24", "Rajkot", "Gujarat", 1.8, 70.8022, 22.3039, Tier::Two),
    ("25", "Ghaziabad", "Uttar Pradesh", 2.4, 77.4538, 28.6692, Tier::Two),
    ("26", "Mysore", "Karnataka", 1.0, 76.6394, 12.2958, Tier::Three),
    ("27", "Aurangabad", "Maharashtra", 1.3, 75.3433, 19.8762, Tier::Three),
    ("28", "Raipur", "Chhattisgarh", 1.1, 81.6296, 21.2514, Tier::Three),
    ("29", "Bhubaneswar", "Odisha", 1.0, 85.8245, 20.2961, Tier::Three),
    ("30", "Dehradun", "Uttarakhand", 0.8, 78.0322, 30.3165, Tier::Three),
    ("31", "Guwahati", "Assam", 1.0, 91.7362, 26.1445, Tier::Three),
    ("32", "Jammu", "Jammu & Kashmir", 0.6, 74.8570, 32.7266, Tier::Three),
    ("33", "Mangalore", "Karnataka", 0.7, 74.8560, 12.9141, Tier::Three),
    ("34", "Madurai", "Tamil Nadu", 1.6, 78.1198, 9.9252, Tier::Three),
    ("35", "Varanasi", "Uttar Pradesh", 1.4, 82.9739, 25.3176, Tier::Three),
    ("36", "Amritsar", "Punjab", 1.2, 74.8723, 31.6340, Tier::Three),
    ("37", "Jodhpur", "Rajasthan", 1.1, 73.0243, 26.2389, Tier::Three),
];

/// The full city registry in registry order. Ranking ties fall back to this order.
pub fn registry() -> Vec<City> {
    REGISTRY
        .iter()
        .map(|&(id, name, state, population, lon, lat, tier)| City::new(id, name, state, population, (lon, lat), tier))
        .collect()
}

pub fn find<'a>(cities: &'a [City], name: &str) -> Option<&'a City> {
    cities.iter().find(|c| c.name == name)
}

pub fn by_tier(cities: &[City], tier: Tier) -> Vec<&City> {
    cities.iter().filter(|c| c.tier == tier).collect()
}
