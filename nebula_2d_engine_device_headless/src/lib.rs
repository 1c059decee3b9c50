/*!
# Nebula 2D Engine - Headless Device Backend

Software implementation of the nebula_2d_engine backend trait with all
texture and buffer storage in host memory. No GPU, window or display server
is required, which makes it the backend of choice for tests, CI and
server-side tooling (atlas baking, asset validation).

Transfers are content-accurate: what you write through a `TextureArray` is
what you read back. Rendering is out of scope; mip generation uses
nearest-neighbor downsampling rather than filtered averaging.

## Example

```
use nebula_2d_engine::nebula2d::device::{Device, TextureArrayDesc};
use nebula_2d_engine_device_headless::HeadlessBackend;

let device = Device::new(HeadlessBackend::new());
let texture = device.texture(TextureArrayDesc {
    size: (64, 64, 4),
    ..Default::default()
})?;
assert_eq!(texture.layers(), 4);
# Ok::<(), nebula_2d_engine::nebula2d::Error>(())
```
*/

mod backend;
mod storage;

pub use backend::HeadlessBackend;
