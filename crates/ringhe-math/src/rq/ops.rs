//! Implementation of operations over polynomials.

use super::Poly;
use crate::Coefficient;
use itertools::izip;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

impl<C: Coefficient> AddAssign<&Poly<C>> for Poly<C> {
    fn add_assign(&mut self, p: &Poly<C>) {
        assert_eq!(self.ctx, p.ctx, "Incompatible contexts");
        let q = &self.ctx.q;
        izip!(self.coefficients.iter_mut(), p.coefficients.iter()).for_each(|(a, b)| {
            let s = a.add_ref(b);
            *a = if &s >= q { s.sub_ref(q) } else { s };
        });
    }
}

impl<C: Coefficient> Add<&Poly<C>> for &Poly<C> {
    type Output = Poly<C>;
    fn add(self, p: &Poly<C>) -> Poly<C> {
        let mut q = self.clone();
        q += p;
        q
    }
}

impl<C: Coefficient> Add for Poly<C> {
    type Output = Poly<C>;
    fn add(mut self, p: Poly<C>) -> Poly<C> {
        self += &p;
        self
    }
}

impl<C: Coefficient> SubAssign<&Poly<C>> for Poly<C> {
    fn sub_assign(&mut self, p: &Poly<C>) {
        assert_eq!(self.ctx, p.ctx, "Incompatible contexts");
        let q = &self.ctx.q;
        izip!(self.coefficients.iter_mut(), p.coefficients.iter()).for_each(|(a, b)| {
            let d = a.sub_ref(b);
            *a = if d < C::zero() { d.add_ref(q) } else { d };
        });
    }
}

impl<C: Coefficient> Sub<&Poly<C>> for &Poly<C> {
    type Output = Poly<C>;
    fn sub(self, p: &Poly<C>) -> Poly<C> {
        let mut q = self.clone();
        q -= p;
        q
    }
}

impl<C: Coefficient> Sub for Poly<C> {
    type Output = Poly<C>;
    fn sub(mut self, p: Poly<C>) -> Poly<C> {
        self -= &p;
        self
    }
}

impl<C: Coefficient> MulAssign<&Poly<C>> for Poly<C> {
    fn mul_assign(&mut self, p: &Poly<C>) {
        *self = &*self * p;
    }
}

impl<C: Coefficient> Mul<&Poly<C>> for &Poly<C> {
    type Output = Poly<C>;

    /// Schoolbook negacyclic multiplication, reducing after every product.
    fn mul(self, p: &Poly<C>) -> Poly<C> {
        assert_eq!(self.ctx, p.ctx, "Incompatible contexts");
        let n = self.ctx.degree;
        let q = &self.ctx.q;
        let mut out = Poly::zero(&self.ctx);
        for (i, a) in self.coefficients.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in p.coefficients.iter().enumerate() {
                if b.is_zero() {
                    continue;
                }
                let product = a.mul_ref(b).rem_euclid_ref(q);
                let k = i + j;
                if k < n {
                    out.coefficients[k] = out.coefficients[k].add_ref(&product).rem_euclid_ref(q);
                } else {
                    out.coefficients[k - n] =
                        out.coefficients[k - n].sub_ref(&product).rem_euclid_ref(q);
                }
            }
        }
        out
    }
}

impl<C: Coefficient> Mul for Poly<C> {
    type Output = Poly<C>;
    fn mul(self, p: Poly<C>) -> Poly<C> {
        &self * &p
    }
}

impl<C: Coefficient> Neg for &Poly<C> {
    type Output = Poly<C>;

    fn neg(self) -> Poly<C> {
        let mut out = self.clone();
        let q = &self.ctx.q;
        out.coefficients.iter_mut().for_each(|c| {
            if !c.is_zero() {
                *c = q.sub_ref(c);
            }
        });
        out
    }
}

impl<C: Coefficient> Neg for Poly<C> {
    type Output = Poly<C>;

    fn neg(self) -> Poly<C> {
        -&self
    }
}
