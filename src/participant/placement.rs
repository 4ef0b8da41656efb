// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Random initial placement and display colours.

use rand::Rng;

use super::Participant;
use crate::error::{Result, YalError};
use crate::yal::span;

/// Move a participant to a uniformly random position with its lower left
/// corner in `[0, x_bound - width) x [0, y_bound - height)`.
///
/// Fails when the frame leaves no room on an axis.
pub fn randomize_placement<R: Rng + ?Sized>(
    participant: &mut Participant,
    (x_bound, y_bound): (i64, i64),
    rng: &mut R,
) -> Result<()> {
    let x_limit = room(participant, 'x', x_bound, participant.width)?;
    let y_limit = room(participant, 'y', y_bound, participant.height)?;
    participant.xmin = rng.gen_range(0..x_limit);
    participant.ymin = rng.gen_range(0..y_limit);
    Ok(())
}

fn room(participant: &Participant, axis: char, bound: i64, extent: i64) -> Result<i64> {
    let limit = span(&participant.idx, axis, extent, bound)?;
    if limit <= 0 {
        return Err(YalError::Configuration {
            idx: participant.idx.clone(),
            axis,
            bound,
            extent,
        });
    }
    Ok(limit)
}

/// Random `#rrggbb` colour
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    let [r, g, b]: [u8; 3] = rng.gen();
    format!("#{r:02x}{g:02x}{b:02x}")
}
