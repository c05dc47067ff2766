mod codec_proptest;
mod sync;
