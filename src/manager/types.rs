use super::TermManager;
use crate::{error::TermError, types::TypeId};

/// Type constructors and type-level queries.
impl TermManager {
    pub fn bool_type(&self) -> TypeId {
        self.types.bool()
    }

    pub fn int_type(&self) -> TypeId {
        self.types.int()
    }

    pub fn real_type(&self) -> TypeId {
        self.types.real()
    }

    pub fn bv_type(&mut self, n: u32) -> Result<TypeId, TermError> {
        let r = Self::check_positive(n as i64).and_then(|_| Self::check_maxbvsize(n as u64));
        self.record(r)?;
        Ok(self.types.bv(n))
    }

    pub fn scalar_type(&mut self, card: u32) -> Result<TypeId, TermError> {
        self.record(Self::check_positive(card as i64))?;
        Ok(self.types.scalar(card))
    }

    pub fn uninterpreted_type(&mut self) -> TypeId {
        self.types.uninterpreted()
    }

    pub fn tuple_type(&mut self, components: &[TypeId]) -> Result<TypeId, TermError> {
        let r = Self::check_positive(components.len() as i64)
            .and_then(|_| Self::check_arity(components.len()))
            .and_then(|_| self.check_good_types(components));
        self.record(r)?;
        Ok(self.types.tuple(components.to_vec()))
    }

    pub fn function_type(&mut self, domain: &[TypeId], range: TypeId) -> Result<TypeId, TermError> {
        let r = Self::check_positive(domain.len() as i64)
            .and_then(|_| Self::check_arity(domain.len()))
            .and_then(|_| self.check_good_type(range, None))
            .and_then(|_| self.check_good_types(domain));
        self.record(r)?;
        Ok(self.types.function(domain.to_vec(), range))
    }

    /// The least common supertype of `tau` and `sigma`, `None` if they are incompatible.
    pub fn supertype(&mut self, tau: TypeId, sigma: TypeId) -> Result<Option<TypeId>, TermError> {
        let r = self
            .check_good_type(tau, Some(0))
            .and_then(|_| self.check_good_type(sigma, Some(1)));
        self.record(r)?;
        Ok(self.types.supertype(tau, sigma))
    }

    pub fn compatible(&mut self, tau: TypeId, sigma: TypeId) -> Result<bool, TermError> {
        let r = self
            .check_good_type(tau, Some(0))
            .and_then(|_| self.check_good_type(sigma, Some(1)));
        self.record(r)?;
        Ok(self.types.compatible(tau, sigma))
    }

    /// Number of elements of `tau`, `None` if infinite or too large.
    pub fn card(&mut self, tau: TypeId) -> Result<Option<u64>, TermError> {
        self.record(self.check_good_type(tau, None))?;
        Ok(self.types.card(tau))
    }

    pub fn is_finite(&mut self, tau: TypeId) -> Result<bool, TermError> {
        self.record(self.check_good_type(tau, None))?;
        Ok(self.types.is_finite(tau))
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::ErrorCode, manager::TermManager, types::TypeId};

    #[test]
    fn test_type_constructor_errors() {
        let mut tm = TermManager::init();
        assert_eq!(tm.bv_type(0).unwrap_err().code(), ErrorCode::PosIntRequired);
        assert_eq!(tm.bv_type(70000).unwrap_err().code(), ErrorCode::MaxBvSizeExceeded);
        assert_eq!(tm.scalar_type(0).unwrap_err().code(), ErrorCode::PosIntRequired);
        assert_eq!(tm.tuple_type(&[]).unwrap_err().code(), ErrorCode::PosIntRequired);
        let e = tm.tuple_type(&[TypeId::INT, TypeId::NULL]).unwrap_err();
        assert_eq!(e.code(), ErrorCode::InvalidType);
        assert_eq!(e.index(), Some(1));
        assert_eq!(
            tm.function_type(&[TypeId::INT], TypeId::NULL).unwrap_err().code(),
            ErrorCode::InvalidType
        );
    }

    #[test]
    fn test_types_are_interned() {
        let mut tm = TermManager::init();
        let a = tm.bv_type(12).unwrap();
        assert_eq!(tm.bv_type(12).unwrap(), a);
        let t = tm.tuple_type(&[a, TypeId::BOOL]).unwrap();
        assert_eq!(tm.tuple_type(&[a, TypeId::BOOL]).unwrap(), t);
        let n = tm.num_types();
        assert_eq!(tm.function_type(&[t], a).unwrap(), tm.function_type(&[t], a).unwrap());
        assert_eq!(tm.num_types(), n + 1);
    }

    #[test]
    fn test_supertype_and_card() {
        let mut tm = TermManager::init();
        let ti = tm.tuple_type(&[TypeId::INT]).unwrap();
        let tr = tm.tuple_type(&[TypeId::REAL]).unwrap();
        assert_eq!(tm.supertype(ti, tr).unwrap(), Some(tr));
        assert!(tm.compatible(TypeId::INT, TypeId::REAL).unwrap());
        assert!(!tm.compatible(TypeId::INT, TypeId::BOOL).unwrap());
        let s = tm.scalar_type(4).unwrap();
        let pair = tm.tuple_type(&[s, TypeId::BOOL]).unwrap();
        assert_eq!(tm.card(pair).unwrap(), Some(8));
        assert!(!tm.is_finite(TypeId::REAL).unwrap());
        assert!(tm.card(TypeId::NULL).is_err());
    }
}
