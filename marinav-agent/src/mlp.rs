//! Multilayer perceptron.
use anyhow::Result;
use marinav_core::error::MarinavError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
/// Multilayer perceptron with ReLU activation function.
///
/// The output layer is linear. Weights are stored as `(out_dim, in_dim)`
/// matrices and inputs are batches of row vectors.
pub struct Mlp {
    /// Weights of layers.
    ws: Vec<Array2<f32>>,

    /// Biases of layers.
    bs: Vec<Array1<f32>>,
}

fn shape_mismatch(msg: String) -> anyhow::Error {
    MarinavError::ShapeMismatch(msg).into()
}

impl Mlp {
    /// Constructs an MLP, checking that the shapes of the layers chain.
    pub fn new(ws: Vec<Array2<f32>>, bs: Vec<Array1<f32>>) -> Result<Self> {
        let mlp = Self { ws, bs };
        mlp.check()?;
        Ok(mlp)
    }

    /// Constructs an MLP with the given layer sizes and uniformly random
    /// weights in `±1/sqrt(in_dim)`.
    pub fn random(dims: &[usize], rng: &mut fastrand::Rng) -> Self {
        let mut ws = vec![];
        let mut bs = vec![];
        for io in dims.windows(2) {
            let (i, o) = (io[0], io[1]);
            let bound = 1.0 / (i.max(1) as f32).sqrt();
            ws.push(Array2::from_shape_fn((o, i), |_| (2.0 * rng.f32() - 1.0) * bound));
            bs.push(Array1::from_shape_fn(o, |_| (2.0 * rng.f32() - 1.0) * bound));
        }
        Self { ws, bs }
    }

    /// Checks the shapes of the layers, e.g. after deserialization.
    pub fn check(&self) -> Result<()> {
        if self.ws.is_empty() || self.ws.len() != self.bs.len() {
            return Err(shape_mismatch(format!(
                "{} weight matrices and {} bias vectors",
                self.ws.len(),
                self.bs.len()
            )));
        }
        for (i, (w, b)) in self.ws.iter().zip(self.bs.iter()).enumerate() {
            if w.nrows() != b.len() {
                return Err(shape_mismatch(format!(
                    "layer {}: weight {:?}, bias {:?}",
                    i,
                    w.shape(),
                    b.shape()
                )));
            }
            if i > 0 && self.ws[i - 1].nrows() != w.ncols() {
                return Err(shape_mismatch(format!(
                    "layer {} outputs {} features, layer {} takes {}",
                    i - 1,
                    self.ws[i - 1].nrows(),
                    i,
                    w.ncols()
                )));
            }
        }
        Ok(())
    }

    /// Input dimension.
    pub fn in_dim(&self) -> usize {
        self.ws.first().map_or(0, |w| w.ncols())
    }

    /// Output dimension.
    pub fn out_dim(&self) -> usize {
        self.ws.last().map_or(0, |w| w.nrows())
    }

    /// Applies the MLP to a batch of row vectors.
    pub fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.in_dim() {
            return Err(shape_mismatch(format!(
                "input has {} features, expected {}",
                x.ncols(),
                self.in_dim()
            )));
        }
        let n_layers = self.ws.len();
        let mut x = x.to_owned();
        for i in 0..n_layers {
            x = x.dot(&self.ws[i].t()) + &self.bs[i];
            if i != n_layers - 1 {
                x.mapv_inplace(relu);
            }
        }
        Ok(x)
    }
}

/// Rectified linear unit.
pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// Position of the largest value, the first one on ties.
pub fn argmax(values: ArrayView1<f32>) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(i_max, v_max), (i, v)| {
            if *v > v_max {
                (i, *v)
            } else {
                (i_max, v_max)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_forward() -> Result<()> {
        let mlp = Mlp::new(
            vec![arr2(&[[1.0, -1.0], [0.5, 0.5]]), arr2(&[[1.0, 2.0]])],
            vec![arr1(&[0.0, 0.0]), arr1(&[1.0])],
        )?;
        let y = mlp.forward(arr2(&[[1.0, 3.0], [3.0, 1.0]]).view())?;
        // first row: hidden [relu(-2), 2] = [0, 2] -> 0 + 4 + 1
        // second row: hidden [2, 2] -> 2 + 4 + 1
        assert_eq!(y, arr2(&[[5.0], [7.0]]));
        Ok(())
    }

    #[test]
    fn test_shape_checks() {
        assert!(Mlp::new(vec![arr2(&[[1.0, 1.0]])], vec![arr1(&[0.0, 0.0])]).is_err());
        assert!(Mlp::new(
            vec![arr2(&[[1.0, 1.0]]), arr2(&[[1.0], [1.0]]), arr2(&[[1.0, 1.0, 1.0]])],
            vec![arr1(&[0.0]), arr1(&[0.0, 0.0]), arr1(&[0.0])],
        )
        .is_err());

        let mut rng = fastrand::Rng::with_seed(0);
        let mlp = Mlp::random(&[3, 8, 2], &mut rng);
        assert_eq!((mlp.in_dim(), mlp.out_dim()), (3, 2));
        assert!(mlp.forward(arr2(&[[1.0, 2.0]]).view()).is_err());
    }

    #[test]
    fn test_argmax_takes_first_on_ties() {
        assert_eq!(argmax(arr1(&[0.5, 2.0, 2.0, -1.0]).view()), 1);
    }
}
