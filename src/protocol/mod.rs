pub mod compare;
pub mod context;
pub mod division;
pub mod maxpool;
pub mod msb;
pub mod randomness;
pub mod relu;
pub mod select_share;
pub mod share_conversion;

use crate::{
    error::{Error, ShapeError},
    secret_sharing::{DtypeClass, SharedTensor},
};

/// Top-level operators take caller-facing sharings only.
pub(crate) fn ensure_standard(a: &SharedTensor) -> Result<(), Error> {
    match a.dtype() {
        DtypeClass::Standard => Ok(()),
        DtypeClass::Bridging => Err(Error::InvalidDtype),
    }
}

pub(crate) fn ensure_aligned(a: &SharedTensor, b: &SharedTensor) -> Result<(), Error> {
    if a.prm().modulus() != b.prm().modulus() {
        return Err(Error::FieldMismatch(a.prm().modulus(), b.prm().modulus()));
    }
    if a.dtype() != b.dtype() {
        return Err(Error::InvalidDtype);
    }
    if a.holders() != b.holders() || a.helper() != b.helper() {
        return Err(Error::RoleMismatch);
    }
    Ok(())
}

pub(crate) fn ensure_same_shape(a: &SharedTensor, b: &SharedTensor) -> Result<(), Error> {
    if a.shape() == b.shape() {
        Ok(())
    } else {
        Err(Error::ShapeMismatch(ShapeError {
            expected: a.shape().to_vec(),
            actual: b.shape().to_vec(),
        }))
    }
}
