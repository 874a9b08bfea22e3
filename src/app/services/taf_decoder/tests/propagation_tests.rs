//! Tests for carry-forward of prevailing conditions between periods

use super::*;
use crate::app::models::{ForecastPeriod, PeriodKind};
use crate::app::services::taf_decoder::fields::{DecodedFields, DecodedPeriod, Visibility, Wind};
use crate::app::services::taf_decoder::periods::PeriodLimits;
use crate::app::services::taf_decoder::propagation::propagate;
use crate::app::services::taf_decoder::tokenizer::Span;

fn period(kind: PeriodKind, fields: DecodedFields) -> DecodedPeriod {
    let t = reference_time();
    DecodedPeriod {
        limits: PeriodLimits {
            period: ForecastPeriod::new(kind, t, t),
            start_token: 0,
            data: Span::new(0, 0),
        },
        fields,
    }
}

fn wind(direction: f64, speed: f64) -> Option<Wind> {
    Some(Wind {
        direction_deg: Some(direction),
        variable: false,
        speed_kmh: speed,
        gust_kmh: None,
    })
}

fn visibility(km: f64) -> Option<Visibility> {
    Some(Visibility { km, is_cavok: false })
}

#[test]
fn test_gaps_filled_from_latest_prevailing_period() {
    let mut periods = vec![
        period(
            PeriodKind::Main,
            DecodedFields {
                wind: wind(90.0, 10.0),
                visibility: visibility(9.999),
                ..Default::default()
            },
        ),
        period(
            PeriodKind::Becmg,
            DecodedFields {
                wind: wind(180.0, 20.0),
                ..Default::default()
            },
        ),
        period(PeriodKind::From, DecodedFields::default()),
    ];

    propagate(&mut periods);

    assert_eq!(periods[1].fields.visibility, visibility(9.999));
    assert_eq!(periods[2].fields.wind, wind(180.0, 20.0));
    assert_eq!(periods[2].fields.visibility, visibility(9.999));
}

#[test]
fn test_local_periods_neither_donate_nor_receive() {
    let mut periods = vec![
        period(
            PeriodKind::Main,
            DecodedFields {
                wind: wind(90.0, 10.0),
                visibility: visibility(9.999),
                ..Default::default()
            },
        ),
        period(
            PeriodKind::Tempo,
            DecodedFields {
                visibility: visibility(1.0),
                ..Default::default()
            },
        ),
        period(
            PeriodKind::Prob,
            DecodedFields {
                wind: wind(270.0, 40.0),
                ..Default::default()
            },
        ),
        period(PeriodKind::From, DecodedFields::default()),
    ];

    propagate(&mut periods);

    assert!(periods[1].fields.wind.is_none());
    assert_eq!(periods[1].fields.visibility, visibility(1.0));
    assert!(periods[2].fields.visibility.is_none());
    assert_eq!(periods[3].fields.wind, wind(90.0, 10.0));
    assert_eq!(periods[3].fields.visibility, visibility(9.999));
}

#[test]
fn test_own_wind_group_kept_whole() {
    let mut periods = vec![
        period(
            PeriodKind::Main,
            DecodedFields {
                wind: Some(Wind {
                    direction_deg: Some(90.0),
                    variable: false,
                    speed_kmh: 10.0,
                    gust_kmh: Some(30.0),
                }),
                ..Default::default()
            },
        ),
        period(
            PeriodKind::From,
            DecodedFields {
                wind: Some(Wind {
                    direction_deg: None,
                    variable: true,
                    speed_kmh: 5.0,
                    gust_kmh: None,
                }),
                ..Default::default()
            },
        ),
    ];

    propagate(&mut periods);

    // No gust is inherited into a period that decoded its own wind
    let from_wind = periods[1].fields.wind.as_ref().unwrap();
    assert!(from_wind.variable);
    assert_eq!(from_wind.gust_kmh, None);
}

#[test]
fn test_decoded_message_follows_propagation_law() {
    let decoder = create_test_decoder();
    let record = decode_record(&decoder, EXAMPLE_ALL_GROUPS);
    let periods = &record.periods;

    // TEMPO keeps only its own groups
    let tempo = &periods[1];
    assert!(tempo.wind_speed_kmh.is_none());
    assert!(approx_eq(tempo.visibility_km, 4.828));
    assert!(tempo.ceiling_km.is_none());

    // BECMG inherits Main's wind and visibility, not the TEMPO's
    let becmg = &periods[2];
    assert_eq!(becmg.wind_dir_deg, periods[0].wind_dir_deg);
    assert_eq!(becmg.wind_speed_kmh, periods[0].wind_speed_kmh);
    assert!(approx_eq(becmg.visibility_km, 9.999));
    assert!(approx_eq(becmg.ceiling_km, 0.9144));

    // FROM has its own wind and inherits the BECMG sky
    let from = &periods[4];
    assert_eq!(from.wind_dir_deg, Some(250.0));
    assert_eq!(from.ceiling_km, becmg.ceiling_km);
    assert_eq!(from.cloud_layers, becmg.cloud_layers);
    assert!(approx_eq(from.visibility_km, 9.999));
}
