use candle_core::{DType, Device, Tensor, Var, D};
use candle_nn::loss::cross_entropy;
use candle_nn::ops::{leaky_relu, softmax};
use candle_nn::{AdamW, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::NeuralNetworkParams;
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::{argmax, ClassifierModel};
use crate::preprocessing::{fit_scaler, Scaler};

const LEAKY_SLOPE: f64 = 0.1;

/// `(name, inputs, outputs)` of one dense layer.
type LayerShape = (&'static str, usize, usize);

fn layer_shapes(inputs: usize, classes: usize, p: &NeuralNetworkParams) -> [LayerShape; 3] {
    [
        ("hidden_1", inputs, p.hidden_nodes),
        ("hidden_2", p.hidden_nodes, p.hidden_nodes_2),
        ("output", p.hidden_nodes_2, classes),
    ]
}

#[derive(Debug, Clone)]
struct Mlp {
    hidden_1: Linear,
    hidden_2: Linear,
    output: Linear,
}

impl Mlp {
    fn weight_norm(&self) -> candle_core::Result<Tensor> {
        let mut total = self.hidden_1.weight().sqr()?.sum_all()?;
        for layer in [&self.hidden_2, &self.output] {
            total = total.add(&layer.weight().sqr()?.sum_all()?)?;
        }
        Ok(total)
    }
}

impl Module for Mlp {
    /// Returns logits; softmax is applied by the loss and by `predict`.
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let xs = leaky_relu(&self.hidden_1.forward(xs)?, LEAKY_SLOPE)?;
        let xs = leaky_relu(&self.hidden_2.forward(&xs)?, LEAKY_SLOPE)?;
        self.output.forward(&xs)
    }
}

fn dense(shape: LayerShape, bias: bool, vb: VarBuilder<'_>) -> candle_core::Result<Linear> {
    let (_, inputs, outputs) = shape;
    if bias {
        candle_nn::linear(inputs, outputs, vb)
    } else {
        candle_nn::linear_no_bias(inputs, outputs, vb)
    }
}

/// Builds the layers over variables already present in `varmap`.
fn build_network(varmap: &VarMap, shapes: &[LayerShape; 3], bias: bool) -> Result<Mlp> {
    let vb = VarBuilder::from_varmap(varmap, DType::F64, &Device::Cpu);
    Ok(Mlp {
        hidden_1: dense(shapes[0], bias, vb.pp(shapes[0].0))?,
        hidden_2: dense(shapes[1], bias, vb.pp(shapes[1].0))?,
        output: dense(shapes[2], bias, vb.pp(shapes[2].0))?,
    })
}

fn insert_vars(varmap: &VarMap, tensors: Vec<(String, Tensor)>) -> Result<()> {
    let mut data = varmap
        .data()
        .lock()
        .map_err(|_| ClassifierError::Estimator("network variables are poisoned".into()))?;
    for (name, tensor) in tensors {
        data.insert(name, Var::from_tensor(&tensor)?);
    }
    Ok(())
}

/// Xavier-uniform weights and zero biases drawn from the seeded `rng`.
fn initial_weights(
    shapes: &[LayerShape; 3],
    bias: bool,
    rng: &mut StdRng,
) -> Result<Vec<(String, Tensor)>> {
    let mut tensors = Vec::new();
    for &(name, inputs, outputs) in shapes {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        let values: Vec<f64> = (0..inputs * outputs)
            .map(|_| rng.gen_range(-limit..limit))
            .collect();
        tensors.push((
            format!("{name}.weight"),
            Tensor::from_vec(values, (outputs, inputs), &Device::Cpu)?,
        ));
        if bias {
            tensors.push((
                format!("{name}.bias"),
                Tensor::zeros(outputs, DType::F64, &Device::Cpu)?,
            ));
        }
    }
    Ok(tensors)
}

fn rows_tensor(x: &Array2<f64>, rows: &[usize]) -> Result<Tensor> {
    let values: Vec<f64> = rows.iter().flat_map(|&r| x.row(r).to_vec()).collect();
    Ok(Tensor::from_vec(values, (rows.len(), x.ncols()), &Device::Cpu)?)
}

#[derive(Serialize, Deserialize)]
struct NamedTensor {
    name: String,
    shape: Vec<usize>,
    values: Vec<f64>,
}

/// Plain-data form of the network used for model files.
#[derive(Serialize, Deserialize)]
struct NetworkSnapshot {
    params: NeuralNetworkParams,
    scaler: Option<Scaler>,
    inputs: usize,
    classes: usize,
    weights: Vec<NamedTensor>,
    losses: Vec<f64>,
}

/// Feed-forward network: two leaky-ReLU hidden layers and a softmax output,
/// trained with mini-batch AdamW on cross-entropy loss.
///
/// Training stops after `epochs` passes or once the epoch loss has failed to
/// improve by `min_change` for `window` consecutive epochs.
pub struct NeuralNetworkClassifier {
    params: NeuralNetworkParams,
    scaler: Option<Scaler>,
    varmap: VarMap,
    network: Option<Mlp>,
    /// `(inputs, classes)` of the fitted network.
    shape: (usize, usize),
    /// Mean cross-entropy after each completed epoch.
    losses: Vec<f64>,
}

impl NeuralNetworkClassifier {
    pub fn new(params: NeuralNetworkParams) -> Self {
        NeuralNetworkClassifier {
            params,
            scaler: None,
            varmap: VarMap::new(),
            network: None,
            shape: (0, 0),
            losses: Vec::new(),
        }
    }

    pub fn params(&self) -> &NeuralNetworkParams {
        &self.params
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    fn snapshot(&self) -> Result<NetworkSnapshot> {
        let data = self
            .varmap
            .data()
            .lock()
            .map_err(|_| ClassifierError::Estimator("network variables are poisoned".into()))?;
        let mut weights = data
            .iter()
            .map(|(name, var)| -> Result<NamedTensor> {
                Ok(NamedTensor {
                    name: name.clone(),
                    shape: var.dims().to_vec(),
                    values: var.flatten_all()?.to_vec1::<f64>()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        weights.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(NetworkSnapshot {
            params: self.params.clone(),
            scaler: self.scaler.clone(),
            inputs: self.shape.0,
            classes: self.shape.1,
            weights,
            losses: self.losses.clone(),
        })
    }

    fn restore(snapshot: NetworkSnapshot) -> Result<Self> {
        let mut model = NeuralNetworkClassifier::new(snapshot.params);
        model.losses = snapshot.losses;
        let scaler = match snapshot.scaler {
            Some(scaler) if !snapshot.weights.is_empty() => scaler,
            _ => return Ok(model),
        };

        let tensors = snapshot
            .weights
            .into_iter()
            .map(|w| -> Result<(String, Tensor)> {
                Ok((w.name, Tensor::from_vec(w.values, w.shape, &Device::Cpu)?))
            })
            .collect::<Result<Vec<_>>>()?;
        insert_vars(&model.varmap, tensors)?;

        let shapes = layer_shapes(snapshot.inputs, snapshot.classes, &model.params);
        model.network = Some(build_network(&model.varmap, &shapes, model.params.bias)?);
        model.shape = (snapshot.inputs, snapshot.classes);
        model.scaler = Some(scaler);
        Ok(model)
    }
}

impl Serialize for NeuralNetworkClassifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.snapshot()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NeuralNetworkClassifier {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> std::result::Result<Self, De::Error> {
        let snapshot = NetworkSnapshot::deserialize(deserializer)?;
        NeuralNetworkClassifier::restore(snapshot).map_err(serde::de::Error::custom)
    }
}

impl ClassifierModel for NeuralNetworkClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(ClassifierError::EmptyDataset);
        }
        let p = self.params.clone();
        let classes = n_classes.max(1);
        let scaler = fit_scaler(x);
        let xs = scaler.transform(x);

        let mut rng = StdRng::seed_from_u64(p.seed);
        let shapes = layer_shapes(x.ncols(), classes, &p);
        let varmap = VarMap::new();
        insert_vars(&varmap, initial_weights(&shapes, p.bias, &mut rng)?)?;
        let network = build_network(&varmap, &shapes, p.bias)?;

        let mut optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: p.learning_rate,
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;

        let mut losses = Vec::new();
        let mut order: Vec<usize> = (0..n).collect();
        let mut best = f64::INFINITY;
        let mut stale = 0;
        for epoch in 1..=p.epochs {
            order.shuffle(&mut rng);
            let mut total = 0.0;
            for batch in order.chunks(p.batch_size) {
                let xb = rows_tensor(&xs, batch)?;
                let targets: Vec<u32> = batch.iter().map(|&i| y[i] as u32).collect();
                let yb = Tensor::from_vec(targets, batch.len(), &Device::Cpu)?;

                let loss = cross_entropy(&network.forward(&xb)?, &yb)?;
                total += loss.to_scalar::<f64>()? * batch.len() as f64;
                let objective = if p.l2_penalty > 0.0 {
                    loss.add(&network.weight_norm()?.affine(0.5 * p.l2_penalty, 0.0)?)?
                } else {
                    loss
                };
                optimizer.backward_step(&objective)?;
            }

            let loss = total / n as f64;
            if !loss.is_finite() {
                return Err(ClassifierError::Estimator(format!(
                    "neural network loss diverged at epoch {epoch}"
                )));
            }
            losses.push(loss);
            log::trace!("Epoch {epoch}: loss {loss:.6}");

            if best - loss > p.min_change {
                best = loss;
                stale = 0;
            } else {
                stale += 1;
                if stale >= p.window {
                    log::debug!("Early stopping after {epoch} epochs (loss {loss:.6})");
                    break;
                }
            }
        }

        self.varmap = varmap;
        self.network = Some(network);
        self.shape = (x.ncols(), classes);
        self.losses = losses;
        self.scaler = Some(scaler);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let (scaler, network) = match (&self.scaler, &self.network) {
            (Some(scaler), Some(network)) => (scaler, network),
            _ => return Err(ClassifierError::NotTrained),
        };
        if x.nrows() == 0 {
            return Ok(Vec::new());
        }

        let xs = scaler.transform(x);
        let rows: Vec<usize> = (0..xs.nrows()).collect();
        let logits = network.forward(&rows_tensor(&xs, &rows)?)?;
        let probabilities = softmax(&logits, D::Minus1)?.to_vec2::<f64>()?;
        Ok(probabilities.into_iter().map(argmax).collect())
    }

    fn is_fitted(&self) -> bool {
        self.network.is_some()
    }

    fn name(&self) -> &str {
        "Multilayer Perceptron"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_params() -> NeuralNetworkParams {
        NeuralNetworkParams {
            hidden_nodes: 16,
            hidden_nodes_2: 8,
            batch_size: 4,
            learning_rate: 0.01,
            epochs: 300,
            window: 50,
            min_change: 0.0,
            seed: 3,
            ..Default::default()
        }
    }

    fn two_clusters() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [0.0, 0.1],
            [0.2, 0.0],
            [0.1, 0.3],
            [0.3, 0.2],
            [3.0, 3.1],
            [3.2, 2.9],
            [2.9, 3.3],
            [3.1, 3.0]
        ];
        (x, vec![0, 0, 0, 0, 1, 1, 1, 1])
    }

    #[test]
    fn learns_linearly_separable_classes() {
        let (x, y) = two_clusters();
        let mut model = NeuralNetworkClassifier::new(small_params());
        model.fit(&x, &y, 2).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);

        let losses = model.losses();
        assert!(losses.last().unwrap() < losses.first().unwrap());
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = vec![0, 0, 1, 1];
        let mut a = NeuralNetworkClassifier::new(small_params());
        let mut b = NeuralNetworkClassifier::new(small_params());
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x, &y, 2).unwrap();
        assert_eq!(a.losses(), b.losses());
    }

    #[test]
    fn l2_penalty_still_converges() {
        let (x, y) = two_clusters();
        let mut model = NeuralNetworkClassifier::new(NeuralNetworkParams {
            l2_penalty: 0.001,
            ..small_params()
        });
        model.fit(&x, &y, 2).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn early_stopping_respects_window() {
        let x = array![[0.0], [1.0]];
        let mut model = NeuralNetworkClassifier::new(NeuralNetworkParams {
            epochs: 1000,
            window: 2,
            min_change: 10.0,
            ..small_params()
        });
        model.fit(&x, &[0, 0], 1).unwrap();
        // only the first epoch counts as an improvement
        assert_eq!(model.losses().len(), 3);
    }

    #[test]
    fn weights_survive_serialization() {
        let (x, y) = two_clusters();
        let mut model = NeuralNetworkClassifier::new(NeuralNetworkParams {
            bias: false,
            ..small_params()
        });
        model.fit(&x, &y, 2).unwrap();

        let bytes = bincode::serialize(&model).unwrap();
        let restored: NeuralNetworkClassifier = bincode::deserialize(&bytes).unwrap();
        assert!(restored.is_fitted());
        assert_eq!(restored.losses(), model.losses());
        assert_eq!(restored.predict(&x).unwrap(), model.predict(&x).unwrap());
    }

    #[test]
    fn unfitted_model_round_trips_unfitted() {
        let model = NeuralNetworkClassifier::new(small_params());
        let bytes = bincode::serialize(&model).unwrap();
        let restored: NeuralNetworkClassifier = bincode::deserialize(&bytes).unwrap();
        assert!(!restored.is_fitted());
    }

    #[test]
    fn predict_before_fit_is_rejected() {
        let model = NeuralNetworkClassifier::new(NeuralNetworkParams::default());
        assert!(matches!(
            model.predict(&array![[0.0]]),
            Err(ClassifierError::NotTrained)
        ));
    }
}
