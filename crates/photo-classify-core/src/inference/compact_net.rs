//! Compact convolutional image classifier.

use anyhow::Result;
use candle_core::{Module, Tensor};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};

/// Output channels of the three convolution stages.
pub const STAGE_CHANNELS: [usize; 3] = [16, 32, 64];

/// Small image classifier.
///
/// Architecture: three 3x3 stride-2 conv layers with ReLU, global average
/// pooling, and a linear head.
/// Input: `(N, 3, H, W)` normalized RGB.
/// Output: `(N, num_classes)` logits.
///
/// Weight names: `conv1`, `conv2`, `conv3`, `head`, each with `weight` and
/// `bias`.
pub struct CompactNet {
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    head: Linear,
    num_classes: usize,
}

impl CompactNet {
    /// Builds the network from weights.
    ///
    /// # Errors
    ///
    /// Returns an error if a tensor is missing or has the wrong shape for
    /// `num_classes`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(vb: VarBuilder, num_classes: usize) -> Result<Self> {
        let cfg = Conv2dConfig {
            padding: 1,
            stride: 2,
            ..Conv2dConfig::default()
        };
        let [c1, c2, c3] = STAGE_CHANNELS;

        let conv1 = conv2d(3, c1, 3, cfg, vb.pp("conv1"))?;
        let conv2 = conv2d(c1, c2, 3, cfg, vb.pp("conv2"))?;
        let conv3 = conv2d(c2, c3, 3, cfg, vb.pp("conv3"))?;
        let head = linear(c3, num_classes, vb.pp("head"))?;

        Ok(Self {
            conv1,
            conv2,
            conv3,
            head,
            num_classes,
        })
    }

    /// Number of classes the head predicts.
    #[must_use]
    pub const fn num_classes(&self) -> usize {
        self.num_classes
    }
}

impl Module for CompactNet {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let x = self.conv1.forward(x)?.relu()?;
        let x = self.conv2.forward(&x)?.relu()?;
        let x = self.conv3.forward(&x)?.relu()?;

        // Global average pool over H and W
        let x = x.mean((2, 3))?;

        self.head.forward(&x)
    }
}
