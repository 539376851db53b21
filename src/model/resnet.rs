//! ResNet Backbone
//!
//! Bottleneck residual network (ResNet-50 by default) built with Burn.
//! Field names mirror the torchvision layout (`conv1`, `bn1`, `layer1`..
//! `layer4`, `downsample`) so PyTorch checkpoints map onto it with only a
//! couple of key remaps.

use burn::{
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, PaddingConfig2d, Relu,
    },
    tensor::{backend::Backend, Tensor},
};

use super::config::{ClassifierConfig, BOTTLENECK_EXPANSION};

/// 1x1 conv + BatchNorm used to match the identity path to a block's output
#[derive(Module, Debug)]
pub struct Downsample<B: Backend> {
    pub conv: Conv2d<B>,
    pub bn: BatchNorm<B>,
}

impl<B: Backend> Downsample<B> {
    fn new(in_channels: usize, out_channels: usize, stride: usize, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], [1, 1])
            .with_stride([stride, stride])
            .with_bias(false)
            .init(device);
        let bn = BatchNormConfig::new(out_channels).init(device);

        Self { conv, bn }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.bn.forward(self.conv.forward(x))
    }
}

/// Bottleneck residual block: 1x1 reduce, 3x3 (strided), 1x1 expand
#[derive(Module, Debug)]
pub struct Bottleneck<B: Backend> {
    pub conv1: Conv2d<B>,
    pub bn1: BatchNorm<B>,
    pub conv2: Conv2d<B>,
    pub bn2: BatchNorm<B>,
    pub conv3: Conv2d<B>,
    pub bn3: BatchNorm<B>,
    pub downsample: Option<Downsample<B>>,
    pub relu: Relu,
}

impl<B: Backend> Bottleneck<B> {
    /// Create a block with `planes` inner channels and `planes * 4` outputs
    pub fn new(in_channels: usize, planes: usize, stride: usize, device: &B::Device) -> Self {
        let out_channels = planes * BOTTLENECK_EXPANSION;

        let conv1 = Conv2dConfig::new([in_channels, planes], [1, 1])
            .with_bias(false)
            .init(device);
        let bn1 = BatchNormConfig::new(planes).init(device);

        let conv2 = Conv2dConfig::new([planes, planes], [3, 3])
            .with_stride([stride, stride])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .with_bias(false)
            .init(device);
        let bn2 = BatchNormConfig::new(planes).init(device);

        let conv3 = Conv2dConfig::new([planes, out_channels], [1, 1])
            .with_bias(false)
            .init(device);
        let bn3 = BatchNormConfig::new(out_channels).init(device);

        let downsample = if stride != 1 || in_channels != out_channels {
            Some(Downsample::new(in_channels, out_channels, stride, device))
        } else {
            None
        };

        Self {
            conv1,
            bn1,
            conv2,
            bn2,
            conv3,
            bn3,
            downsample,
            relu: Relu::new(),
        }
    }

    /// Forward pass through the block
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let identity = match &self.downsample {
            Some(downsample) => downsample.forward(x.clone()),
            None => x.clone(),
        };

        let out = self.relu.forward(self.bn1.forward(self.conv1.forward(x)));
        let out = self.relu.forward(self.bn2.forward(self.conv2.forward(out)));
        let out = self.bn3.forward(self.conv3.forward(out));

        self.relu.forward(out + identity)
    }
}

/// Convolutional feature extractor producing one pooled vector per image
#[derive(Module, Debug)]
pub struct ResNetBackbone<B: Backend> {
    pub conv1: Conv2d<B>,
    pub bn1: BatchNorm<B>,
    pub relu: Relu,
    pub maxpool: MaxPool2d,
    pub layer1: Vec<Bottleneck<B>>,
    pub layer2: Vec<Bottleneck<B>>,
    pub layer3: Vec<Bottleneck<B>>,
    pub layer4: Vec<Bottleneck<B>>,
    pub avgpool: AdaptiveAvgPool2d,
}

impl<B: Backend> ResNetBackbone<B> {
    /// Build the backbone described by `config`
    pub fn new(config: &ClassifierConfig, device: &B::Device) -> Self {
        let base = config.base_width;

        // Stem: 7x7/2 conv then 3x3/2 max pool
        let conv1 = Conv2dConfig::new([config.in_channels, base], [7, 7])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(3, 3))
            .with_bias(false)
            .init(device);
        let bn1 = BatchNormConfig::new(base).init(device);
        let maxpool = MaxPool2dConfig::new([3, 3])
            .with_strides([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init();

        let (layer1, channels) = make_stage(base, base, config.layers[0], 1, device);
        let (layer2, channels) = make_stage(channels, base * 2, config.layers[1], 2, device);
        let (layer3, channels) = make_stage(channels, base * 4, config.layers[2], 2, device);
        let (layer4, _) = make_stage(channels, base * 8, config.layers[3], 2, device);

        Self {
            conv1,
            bn1,
            relu: Relu::new(),
            maxpool,
            layer1,
            layer2,
            layer3,
            layer4,
            avgpool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, channels, height, width]
    ///
    /// # Returns
    /// * Pooled features of shape [batch_size, feature_dim]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.relu.forward(self.bn1.forward(self.conv1.forward(x)));
        let mut x = self.maxpool.forward(x);

        for block in self
            .layer1
            .iter()
            .chain(&self.layer2)
            .chain(&self.layer3)
            .chain(&self.layer4)
        {
            x = block.forward(x);
        }

        // [B, C, H, W] -> [B, C, 1, 1] -> [B, C]
        let x = self.avgpool.forward(x);
        let [batch_size, channels, _, _] = x.dims();
        x.reshape([batch_size, channels])
    }
}

fn make_stage<B: Backend>(
    in_channels: usize,
    planes: usize,
    blocks: usize,
    stride: usize,
    device: &B::Device,
) -> (Vec<Bottleneck<B>>, usize) {
    let out_channels = planes * BOTTLENECK_EXPANSION;
    let mut layer = Vec::with_capacity(blocks);

    layer.push(Bottleneck::new(in_channels, planes, stride, device));
    for _ in 1..blocks {
        layer.push(Bottleneck::new(out_channels, planes, 1, device));
    }

    (layer, out_channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InferenceBackend;

    type TestBackend = InferenceBackend;

    #[test]
    fn test_bottleneck_downsamples() {
        let device = Default::default();
        let block = Bottleneck::<TestBackend>::new(8, 4, 2, &device);
        assert!(block.downsample.is_some());

        let input = Tensor::<TestBackend, 4>::zeros([1, 8, 16, 16], &device);
        let output = block.forward(input);
        assert_eq!(output.dims(), [1, 16, 8, 8]);
    }

    #[test]
    fn test_bottleneck_identity_when_shapes_match() {
        let device = Default::default();
        let block = Bottleneck::<TestBackend>::new(16, 4, 1, &device);
        assert!(block.downsample.is_none());
    }

    #[test]
    fn test_backbone_feature_dim() {
        let device = Default::default();
        let config = ClassifierConfig::new(3)
            .with_layers([1, 1, 1, 1])
            .with_base_width(4);
        let backbone = ResNetBackbone::<TestBackend>::new(&config, &device);

        let input = Tensor::<TestBackend, 4>::zeros([2, 3, 64, 64], &device);
        let features = backbone.forward(input);
        assert_eq!(features.dims(), [2, config.feature_dim()]);
    }

    #[test]
    fn test_stage_lengths_follow_config() {
        let device = Default::default();
        let config = ClassifierConfig::new(3)
            .with_layers([2, 1, 3, 1])
            .with_base_width(2);
        let backbone = ResNetBackbone::<TestBackend>::new(&config, &device);

        assert_eq!(backbone.layer1.len(), 2);
        assert_eq!(backbone.layer2.len(), 1);
        assert_eq!(backbone.layer3.len(), 3);
        assert_eq!(backbone.layer4.len(), 1);
    }
}
