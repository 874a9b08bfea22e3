//! Carry-forward of wind, visibility and sky groups between periods
//!
//! Main, From and Becmg periods describe the prevailing forecast, so a group
//! they leave out is taken from the latest earlier prevailing period. Tempo
//! and Prob periods are local overlays: they neither donate nor receive.

use super::fields::{DecodedPeriod, Sky, Visibility, Wind};

#[derive(Debug, Default)]
struct Prevailing {
    wind: Option<Wind>,
    visibility: Option<Visibility>,
    sky: Option<Sky>,
}

/// Fill missing groups of prevailing periods from earlier prevailing periods
///
/// A period's own decoded group always wins; each group (wind, visibility
/// with CAVOK, ceiling with layers) is copied as a unit.
pub fn propagate(periods: &mut [DecodedPeriod]) {
    let mut prevailing = Prevailing::default();

    for period in periods.iter_mut().filter(|p| !p.kind().is_local()) {
        let fields = &mut period.fields;
        carry(&mut fields.wind, &mut prevailing.wind);
        carry(&mut fields.visibility, &mut prevailing.visibility);
        carry(&mut fields.sky, &mut prevailing.sky);
    }
}

fn carry<T: Clone>(own: &mut Option<T>, prevailing: &mut Option<T>) {
    if own.is_some() {
        prevailing.clone_from(own);
    } else {
        own.clone_from(prevailing);
    }
}
