//! Transfer operators for multigrid
//!
//! Restriction (fine-to-coarse) and prolongation (coarse-to-fine) between
//! fields whose resolutions satisfy `n_fine = 2 (n_coarse - 1) + 1` on both axes.

use crate::error::{MultigridError, Result};
use crate::field::ScalarField;

/// Fine resolution matching a coarse one
pub fn refined_resolution(n: usize) -> usize {
    2 * n.saturating_sub(1) + 1
}

fn check_compatible(operation: &'static str, coarse: &ScalarField, fine: &ScalarField) -> Result<()> {
    let (nxc, nzc) = coarse.shape();
    if nxc < 2 || nzc < 2 {
        return Err(MultigridError::ResolutionTooSmall {
            operation,
            nx: nxc,
            nz: nzc,
            minimum: 2,
        });
    }
    let expected = (refined_resolution(nxc), refined_resolution(nzc));
    if fine.shape() != expected {
        return Err(MultigridError::ResolutionMismatch {
            operation,
            expected,
            actual: fine.shape(),
        });
    }
    Ok(())
}

/// Full-weighting restriction of `fine` into `coarse`
///
/// Fine neighbours of a coincident point are weighted 4 (centre), 2 (along a
/// grid line) and 1 (diagonal). Neighbours outside the grid are dropped and
/// the weights renormalised, giving the `/16` interior, `/12` edge and `/9`
/// corner stencils.
pub fn restrict(coarse: &mut ScalarField, fine: &ScalarField) -> Result<()> {
    check_compatible("restrict", coarse, fine)?;
    let (nxf, nzf) = fine.shape();
    let values = fine.values();

    let mut dest = coarse.values_mut();
    for ((ic, jc), target) in dest.indexed_iter_mut() {
        let (i, j) = (2 * ic, 2 * jc);
        let mut sum = 0.0;
        let mut weight = 0.0;
        for di in -1isize..=1 {
            let Some(fi) = i.checked_add_signed(di).filter(|&fi| fi < nxf) else {
                continue;
            };
            for dj in -1isize..=1 {
                let Some(fj) = j.checked_add_signed(dj).filter(|&fj| fj < nzf) else {
                    continue;
                };
                let w = ((2 - di.abs()) * (2 - dj.abs())) as f64;
                sum += w * values[[fi, fj]];
                weight += w;
            }
        }
        *target = sum / weight;
    }
    Ok(())
}

/// Bilinear prolongation of `coarse` into `fine`
///
/// Coincident points are injected, points on coarse grid lines take the mean
/// of their two neighbours and cell centres the mean of the four corners.
pub fn prolong(coarse: &ScalarField, fine: &mut ScalarField) -> Result<()> {
    check_compatible("prolong", coarse, fine)?;
    let c = coarse.values();

    let mut dest = fine.values_mut();
    for ((i, j), target) in dest.indexed_iter_mut() {
        let (ic, jc) = (i / 2, j / 2);
        *target = match (i % 2, j % 2) {
            (0, 0) => c[[ic, jc]],
            (1, 0) => 0.5 * (c[[ic, jc]] + c[[ic + 1, jc]]),
            (0, _) => 0.5 * (c[[ic, jc]] + c[[ic, jc + 1]]),
            _ => {
                0.25 * (c[[ic, jc]] + c[[ic + 1, jc]] + c[[ic, jc + 1]] + c[[ic + 1, jc + 1]])
            }
        };
    }
    Ok(())
}
