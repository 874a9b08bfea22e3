//! Forecast group decoding within one period's data span
//!
//! Sub-decoders run in a fixed order (wind, CAVOK, visibility, clouds,
//! weather, temperatures) and each claims the tokens it recognizes, so a
//! token matched by one is invisible to the rest.

use chrono::{DateTime, Utc};
use tracing::trace;

use super::error::DecodeError;
use super::field_parsers::{has_alpha, parse_temperature_group, Scanner};
use super::periods::PeriodLimits;
use super::time_resolver::TimeResolver;
use super::tokenizer::{Span, TokenLedger};
use crate::app::models::{CloudLayer, ForecastPeriod, PeriodKind};
use crate::constants::{
    self, markers, CEILING_COVERAGE_THRESHOLD, FEET_TO_KM, KM_PER_MI, MAX_VISIBILITY_KM,
    UNLIMITED_CEILING_KM, WIND_UNITS,
};

/// Width of the wind direction field
const WIND_DIRECTION_WIDTH: usize = 3;

/// Decoded wind group
#[derive(Debug, Clone, PartialEq)]
pub struct Wind {
    pub direction_deg: Option<f64>,
    pub variable: bool,
    pub speed_kmh: f64,
    pub gust_kmh: Option<f64>,
}

/// Decoded visibility, with CAVOK folded in
#[derive(Debug, Clone, PartialEq)]
pub struct Visibility {
    pub km: f64,
    pub is_cavok: bool,
}

/// Decoded sky condition: ceiling plus the layers it was derived from
#[derive(Debug, Clone, PartialEq)]
pub struct Sky {
    pub ceiling_km: f64,
    pub layers: Vec<CloudLayer>,
}

/// Temperature extreme and when it occurs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureExtreme {
    pub celsius: f64,
    pub time: DateTime<Utc>,
}

/// Groups decoded for one period
///
/// `None` means the group was not present in the period's own tokens, which
/// is what propagation uses to decide what to fill in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFields {
    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    pub sky: Option<Sky>,
    pub weather: Vec<String>,
    pub max_temp: Option<TemperatureExtreme>,
    pub min_temp: Option<TemperatureExtreme>,
}

impl DecodedFields {
    /// Copy the decoded groups onto a forecast period
    pub fn apply_to(&self, period: &mut ForecastPeriod) {
        if let Some(wind) = &self.wind {
            period.wind_dir_deg = wind.direction_deg;
            period.wind_variable = wind.variable;
            period.wind_speed_kmh = Some(wind.speed_kmh);
            period.wind_gust_kmh = wind.gust_kmh;
        }
        if let Some(visibility) = &self.visibility {
            period.visibility_km = Some(visibility.km);
            period.is_cavok = visibility.is_cavok;
        }
        if let Some(sky) = &self.sky {
            period.ceiling_km = Some(sky.ceiling_km);
            period.cloud_layers = sky.layers.clone();
        }
        period.weather = self.weather.clone();
        if let Some(max) = self.max_temp {
            period.max_temp_c = Some(max.celsius);
            period.max_temp_time = Some(max.time);
        }
        if let Some(min) = self.min_temp {
            period.min_temp_c = Some(min.celsius);
            period.min_temp_time = Some(min.time);
        }
    }
}

/// A period together with its decoded groups
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPeriod {
    pub limits: PeriodLimits,
    pub fields: DecodedFields,
}

impl DecodedPeriod {
    pub fn kind(&self) -> PeriodKind {
        self.limits.kind()
    }

    /// Finish the period with its (possibly propagated) groups applied
    pub fn into_period(self) -> ForecastPeriod {
        let mut period = self.limits.period;
        self.fields.apply_to(&mut period);
        period
    }
}

/// Decode all forecast groups in `span`
///
/// Wind, visibility and clouds are mandatory for the Main period only; later
/// periods may inherit them.
pub fn decode_fields(
    ledger: &mut TokenLedger,
    span: Span,
    kind: PeriodKind,
    resolver: &TimeResolver,
) -> Result<DecodedFields, DecodeError> {
    let mandatory = kind == PeriodKind::Main;
    let mut fields = DecodedFields {
        wind: decode_wind(ledger, span),
        ..DecodedFields::default()
    };
    if mandatory && fields.wind.is_none() {
        return Err(DecodeError::MissingMainField { field: "wind" });
    }

    if claim_cavok(ledger, span) {
        fields.visibility = Some(Visibility {
            km: MAX_VISIBILITY_KM,
            is_cavok: true,
        });
    } else {
        fields.visibility = decode_visibility(ledger, span).map(|km| Visibility { km, is_cavok: false });
        if mandatory && fields.visibility.is_none() {
            return Err(DecodeError::MissingMainField { field: "visibility" });
        }

        fields.sky = decode_sky(ledger, span);
        if mandatory && fields.sky.is_none() {
            return Err(DecodeError::MissingMainField { field: "clouds" });
        }
    }

    let has_cumulonimbus = fields
        .sky
        .as_ref()
        .is_some_and(|sky| sky.layers.iter().any(|l| l.has_cumulonimbus));
    fields.weather = decode_weather(ledger, span, has_cumulonimbus);

    let (max_temp, min_temp) = decode_temperatures(ledger, span, resolver);
    fields.max_temp = max_temp;
    fields.min_temp = min_temp;

    Ok(fields)
}

// =============================================================================
// Wind
// =============================================================================

fn decode_wind(ledger: &mut TokenLedger, span: Span) -> Option<Wind> {
    let (units_index, factor) = ledger.available(span).find_map(|(index, token)| {
        WIND_UNITS
            .iter()
            .find(|(unit, _)| token.contains(unit))
            .map(|(_, factor)| (index, *factor))
    })?;
    ledger.consume(units_index);

    // Units are sometimes split from the group ("18015 KT")
    let units_token = ledger.token(units_index)?;
    let group_index = if starts_wind_group(units_token) {
        units_index
    } else {
        ledger
            .available(Span::new(span.start, units_index))
            .last()
            .map(|(index, _)| index)?
    };

    let wind = parse_wind_group(ledger.token(group_index)?, factor)?;
    if group_index != units_index {
        ledger.consume(group_index);
    }
    trace!("Wind {:?} from token {}", wind, group_index);
    Some(wind)
}

fn starts_wind_group(token: &str) -> bool {
    token.starts_with(markers::VARIABLE_WIND) || Scanner::new(token).number(WIND_DIRECTION_WIDTH).is_some()
}

/// Parse `dddff[Gfff]` or `VRBff[Gff]`, converting speeds with `factor`
fn parse_wind_group(group: &str, factor: f64) -> Option<Wind> {
    let variable = group.starts_with(markers::VARIABLE_WIND);
    let direction_deg = if variable {
        None
    } else {
        Some(f64::from(Scanner::new(group).number(WIND_DIRECTION_WIDTH)?))
    };

    let speed_part = group.get(WIND_DIRECTION_WIDTH..)?;
    let speed = Scanner::new(speed_part).number(3)?;

    let gust = speed_part
        .find('G')
        .or_else(|| speed_part.find('P'))
        .and_then(|pos| Scanner::new(&speed_part[pos + 1..]).number(3));

    Some(Wind {
        direction_deg,
        variable,
        speed_kmh: f64::from(speed) * factor,
        gust_kmh: gust.map(|g| f64::from(g) * factor),
    })
}

// =============================================================================
// Visibility
// =============================================================================

fn claim_cavok(ledger: &mut TokenLedger, span: Span) -> bool {
    match ledger.find_available(span, |t| t.contains(markers::CAVOK)) {
        Some((index, _)) => ledger.consume(index),
        None => false,
    }
}

fn decode_visibility(ledger: &mut TokenLedger, span: Span) -> Option<f64> {
    let (index, km) = ledger
        .available(span)
        .find_map(|(index, token)| visibility_km(token).map(|km| (index, km)))?;
    ledger.consume(index);
    Some(km)
}

/// Visibility in km for a single token, if it is a visibility group
fn visibility_km(token: &str) -> Option<f64> {
    if token.contains("P6SM") {
        return Some(MAX_VISIBILITY_KM);
    }

    if token.contains("SM") {
        let miles = Scanner::new(token).number(9).or_else(|| {
            let mut scanner = Scanner::new(token);
            scanner.literal("P")?;
            scanner.number(9)
        })?;
        return Some(f64::from(miles) * KM_PER_MI);
    }

    // metres: no letters allowed
    if has_alpha(token) {
        return None;
    }
    Scanner::new(token).number(9).map(|m| f64::from(m) / 1000.0)
}

// =============================================================================
// Clouds
// =============================================================================

fn decode_sky(ledger: &mut TokenLedger, span: Span) -> Option<Sky> {
    let candidates: Vec<(usize, String)> = ledger
        .available(span)
        .map(|(index, token)| (index, token.to_string()))
        .collect();

    let mut layers = Vec::new();
    for (index, token) in candidates {
        if token.contains("SKC") || token.contains("NSC") {
            ledger.consume(index);
            return Some(Sky {
                ceiling_km: UNLIMITED_CEILING_KM,
                layers: Vec::new(),
            });
        }

        if let Some(height) = prefixed_height_km(&token, "VV") {
            ledger.consume(index);
            return Some(Sky {
                ceiling_km: height,
                layers: Vec::new(),
            });
        }

        let layer = token.get(..3).and_then(|code| {
            let coverage = constants::cloud_coverage(code)?;
            prefixed_height_km(&token, code).map(|height_km| CloudLayer {
                height_km,
                coverage,
                has_cumulonimbus: token.contains(markers::CUMULONIMBUS),
            })
        });
        if let Some(layer) = layer {
            ledger.consume(index);
            layers.push(layer);
        }
    }

    if layers.is_empty() {
        return None;
    }

    let ceiling_km = layers
        .iter()
        .filter(|l| l.coverage > CEILING_COVERAGE_THRESHOLD)
        .map(|l| l.height_km)
        .fold(UNLIMITED_CEILING_KM, f64::min);

    Some(Sky { ceiling_km, layers })
}

/// Height in km of a `<prefix>hhh` group, where hhh is hundreds of feet
fn prefixed_height_km(token: &str, prefix: &str) -> Option<f64> {
    let mut scanner = Scanner::new(token);
    scanner.literal(prefix)?;
    let hundreds = scanner.number(5)?;
    Some(f64::from(hundreds) * 100.0 * FEET_TO_KM)
}

// =============================================================================
// Weather and temperatures
// =============================================================================

fn decode_weather(ledger: &mut TokenLedger, span: Span, has_cumulonimbus: bool) -> Vec<String> {
    let matches: Vec<(usize, String)> = ledger
        .available(span)
        .filter(|(_, token)| constants::is_weather_token(token))
        .map(|(index, token)| (index, token.to_string()))
        .collect();

    let mut weather = Vec::with_capacity(matches.len() + 1);
    if has_cumulonimbus {
        weather.push(markers::CUMULONIMBUS.to_string());
    }
    for (index, token) in matches {
        ledger.consume(index);
        weather.push(token);
    }
    weather
}

fn decode_temperatures(
    ledger: &mut TokenLedger,
    span: Span,
    resolver: &TimeResolver,
) -> (Option<TemperatureExtreme>, Option<TemperatureExtreme>) {
    let candidates: Vec<(usize, String)> = ledger
        .available(span)
        .map(|(index, token)| (index, token.to_string()))
        .collect();

    let mut max_temp = None;
    let mut min_temp = None;
    for (index, token) in candidates {
        let (slot, positive, negative) = if token.starts_with("TX") {
            (&mut max_temp, "TX", "TXM")
        } else if token.starts_with("TN") {
            (&mut min_temp, "TN", "TNM")
        } else {
            continue;
        };

        let parsed = parse_temperature_group(&token, positive)
            .map(|(value, day, hour)| (f64::from(value), day, hour))
            .or_else(|| {
                parse_temperature_group(&token, negative)
                    .map(|(value, day, hour)| (-f64::from(value), day, hour))
            });
        let Some((celsius, day, hour)) = parsed else {
            continue;
        };
        match resolver.resolve(day, hour, 0) {
            Ok(time) => {
                *slot = Some(TemperatureExtreme { celsius, time });
                ledger.consume(index);
            }
            Err(e) => trace!("Skipping temperature group '{}': {}", token, e),
        }
    }
    (max_temp, min_temp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::taf_decoder::tokenizer::tokenize;
    use chrono::TimeZone;

    fn decode(text: &str, kind: PeriodKind) -> Result<DecodedFields, DecodeError> {
        let mut ledger = TokenLedger::new(tokenize(text));
        let span = ledger.full_span();
        let resolver = TimeResolver::new(Utc.with_ymd_and_hms(2024, 3, 26, 12, 0, 0).unwrap());
        decode_fields(&mut ledger, span, kind, &resolver)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_wind_knots() {
        let wind = parse_wind_group("09008KT", 1.852).unwrap();
        assert_eq!(wind.direction_deg, Some(90.0));
        assert!(approx(wind.speed_kmh, 14.816));
        assert_eq!(wind.gust_kmh, None);
    }

    #[test]
    fn test_wind_with_gust() {
        let wind = parse_wind_group("18015G25KT", 1.852).unwrap();
        assert_eq!(wind.direction_deg, Some(180.0));
        assert!(approx(wind.speed_kmh, 27.78));
        assert!(approx(wind.gust_kmh.unwrap(), 46.3));
    }

    #[test]
    fn test_wind_variable_and_mps() {
        let wind = parse_wind_group("VRB03MPS", 3.6).unwrap();
        assert!(wind.variable);
        assert_eq!(wind.direction_deg, None);
        assert!(approx(wind.speed_kmh, 10.8));
        // The P of MPS is not a gust marker when nothing numeric follows
        assert_eq!(wind.gust_kmh, None);
    }

    #[test]
    fn test_wind_split_units_steps_back() {
        let fields = decode("27015 KT 9999 FEW020", PeriodKind::Main).unwrap();
        let wind = fields.wind.unwrap();
        assert_eq!(wind.direction_deg, Some(270.0));
        assert!(approx(wind.speed_kmh, 15.0 * 1.852));
    }

    #[test]
    fn test_visibility_forms() {
        assert_eq!(visibility_km("P6SM"), Some(MAX_VISIBILITY_KM));
        assert!(approx(visibility_km("3SM").unwrap(), 4.828032));
        assert!(approx(visibility_km("P4SM").unwrap(), 4.0 * KM_PER_MI));
        assert_eq!(visibility_km("9999"), Some(9.999));
        assert_eq!(visibility_km("0800"), Some(0.8));
        assert_eq!(visibility_km("BKN015"), None);
        assert_eq!(visibility_km("M1/4SM"), None);
    }

    #[test]
    fn test_cloud_layers_and_ceiling() {
        let fields = decode("09008KT 9999 FEW010 SCT025CB BKN040 OVC080", PeriodKind::Main).unwrap();
        let sky = fields.sky.unwrap();
        assert_eq!(sky.layers.len(), 4);
        assert!(sky.layers[1].has_cumulonimbus);
        assert!(approx(sky.ceiling_km, 4000.0 * FEET_TO_KM));
        assert_eq!(fields.weather, vec!["CB".to_string()]);
    }

    #[test]
    fn test_high_broken_layer_leaves_ceiling_unlimited() {
        let fields = decode("09008KT 9999 BKN150", PeriodKind::Main).unwrap();
        assert!(approx(fields.sky.unwrap().ceiling_km, UNLIMITED_CEILING_KM));
    }

    #[test]
    fn test_sky_clear_and_vertical_visibility() {
        let sky = decode("09008KT P6SM SKC", PeriodKind::Main).unwrap().sky.unwrap();
        assert!(sky.layers.is_empty());
        assert!(approx(sky.ceiling_km, UNLIMITED_CEILING_KM));

        let sky = decode("00000KT 0100 FG VV002", PeriodKind::Main).unwrap().sky.unwrap();
        assert!(sky.layers.is_empty());
        assert!(approx(sky.ceiling_km, 200.0 * FEET_TO_KM));
    }

    #[test]
    fn test_cavok_skips_visibility_and_clouds() {
        let fields = decode("24010KT CAVOK TX18/2614Z", PeriodKind::Main).unwrap();
        let visibility = fields.visibility.unwrap();
        assert!(visibility.is_cavok);
        assert_eq!(visibility.km, MAX_VISIBILITY_KM);
        assert!(fields.sky.is_none());
        assert_eq!(fields.max_temp.unwrap().celsius, 18.0);
    }

    #[test]
    fn test_weather_tokens_kept_verbatim() {
        let fields = decode("18010KT 3SM -SHRA BR OVC010", PeriodKind::Main).unwrap();
        assert_eq!(fields.weather, vec!["-SHRA".to_string(), "BR".to_string()]);
    }

    #[test]
    fn test_temperature_extremes() {
        let fields = decode("09008KT 9999 SKC TX25/2621Z TNM03/2710Z", PeriodKind::Main).unwrap();
        let max = fields.max_temp.unwrap();
        let min = fields.min_temp.unwrap();
        assert_eq!(max.celsius, 25.0);
        assert_eq!(max.time, Utc.with_ymd_and_hms(2024, 3, 26, 21, 0, 0).unwrap());
        assert_eq!(min.celsius, -3.0);
        assert_eq!(min.time, Utc.with_ymd_and_hms(2024, 3, 27, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_main_requires_wind_visibility_clouds() {
        assert_eq!(
            decode("P6SM SKC", PeriodKind::Main),
            Err(DecodeError::MissingMainField { field: "wind" })
        );
        assert_eq!(
            decode("09008KT SKC", PeriodKind::Main),
            Err(DecodeError::MissingMainField { field: "visibility" })
        );
        assert_eq!(
            decode("09008KT P6SM", PeriodKind::Main),
            Err(DecodeError::MissingMainField { field: "clouds" })
        );
    }

    #[test]
    fn test_later_periods_tolerate_missing_groups() {
        let fields = decode("TSRA", PeriodKind::Tempo).unwrap();
        assert!(fields.wind.is_none());
        assert!(fields.visibility.is_none());
        assert!(fields.sky.is_none());
        assert_eq!(fields.weather, vec!["TSRA".to_string()]);
    }
}
