mod tests {
    use std::vec::Vec;

    use myrtio_pixel_wire::chipset::clockless::{
        Clockless, ClocklessChipset, ClocklessConfig, ParallelClockless, extract_white,
    };
    use myrtio_pixel_wire::color::{ColorOrder, Rgb};
    use myrtio_pixel_wire::controller::{Controller, Device, PixelWriter};
    use myrtio_pixel_wire::dither::DitherMode;
    use myrtio_pixel_wire::pixels::PixelController;
    use myrtio_pixel_wire::transport::{
        BitCell, ClocklessTiming, ConfigError, ParallelTimingEngine, PulseEngine, PulseLine,
        TimingEngine,
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Edge {
        High(u32),
        Low(u32),
    }

    /// Line that records every edge with the tick it happened at
    #[derive(Debug, Default)]
    struct RecordingLine {
        now: u32,
        edges: Vec<(u32, Edge)>,
    }

    impl PulseLine for RecordingLine {
        fn assert(&mut self, lanes: u32) {
            self.edges.push((self.now, Edge::High(lanes)));
        }

        fn deassert(&mut self, lanes: u32) {
            self.edges.push((self.now, Edge::Low(lanes)));
        }

        fn delay_ticks(&mut self, ticks: u32) {
            self.now += ticks;
        }
    }

    impl RecordingLine {
        /// Decode single-lane bits from the high time of every cell
        fn bits(&self, t1: u32) -> Vec<bool> {
            let mut bits = Vec::new();
            let mut rising = None;
            for &(at, edge) in &self.edges {
                match edge {
                    Edge::High(_) => rising = Some(at),
                    Edge::Low(_) => {
                        if let Some(start) = rising.take() {
                            bits.push(at - start > t1);
                        }
                    }
                }
            }
            bits
        }
    }

    #[derive(Debug, Default)]
    struct RecordingEngine {
        frames: usize,
        open: bool,
        bytes: Vec<u8>,
        widths: Vec<u8>,
    }

    impl TimingEngine for RecordingEngine {
        fn begin_frame(&mut self) {
            self.open = true;
        }

        fn write_bits(&mut self, value: u8, bits: u8) {
            assert!(self.open);
            self.bytes.push(value);
            self.widths.push(bits);
        }

        fn end_frame(&mut self) {
            self.open = false;
            self.frames += 1;
        }
    }

    #[derive(Debug, Default)]
    struct RecordingLanes {
        cells: Vec<[u8; 2]>,
    }

    impl ParallelTimingEngine<2> for RecordingLanes {
        fn begin_frame(&mut self) {}

        fn write_lane_bytes(&mut self, bytes: &[u8; 2], bits: u8) {
            assert_eq!(bits, 8);
            self.cells.push(*bytes);
        }

        fn end_frame(&mut self) {}
    }

    fn to_bits(bytes: &[u8]) -> Vec<bool> {
        bytes
            .iter()
            .flat_map(|byte| (0..8u8).map(move |bit| byte & (0x80u8 >> bit) != 0))
            .collect()
    }

    #[test]
    fn test_bit_cell_edges() {
        let timing = ClocklessTiming::from_ticks(2, 5, 3);
        let mut engine = PulseEngine::new(RecordingLine::default(), timing);
        assert_eq!(engine.phase(), BitCell::Idle);

        engine.write_cell(0);
        assert_eq!(engine.phase(), BitCell::BitComplete);
        engine.write_cell(1);

        let line = engine.into_line();
        assert_eq!(
            line.edges,
            [
                (0, Edge::High(1)),
                (2, Edge::Low(1)),
                (10, Edge::High(1)),
                (17, Edge::Low(1)),
            ]
        );
        assert_eq!(line.now, 20);
    }

    #[test]
    fn test_bit_cell_lanes() {
        let timing = ClocklessTiming::from_ticks(2, 5, 3);
        let mut engine = PulseEngine::new(RecordingLine::default(), timing).with_lanes(0b11);
        ParallelTimingEngine::<2>::write_lane_bytes(&mut engine, &[0x80, 0x00], 8);

        let line = engine.into_line();
        assert_eq!(line.now, 80);
        assert_eq!(
            &line.edges[..3],
            &[(0, Edge::High(0b11)), (2, Edge::Low(0b10)), (7, Edge::Low(0b01))]
        );
        assert_eq!(
            &line.edges[3..5],
            &[(10, Edge::High(0b11)), (12, Edge::Low(0b11))]
        );
    }

    #[test]
    fn test_timing_from_ns() {
        assert_eq!(
            ClocklessTiming::from_ns(250, 625, 375, 80_000_000),
            Ok(ClocklessTiming::from_ticks(20, 50, 30))
        );
        assert_eq!(
            ClocklessTiming::from_ns(250, 625, 375, 10_000_000),
            Ok(ClocklessTiming::from_ticks(3, 7, 4))
        );
        assert_eq!(
            ClocklessTiming::from_ns(250, 625, 375, 1_000_000),
            Err(ConfigError::TooCoarse {
                ns: 250,
                error_ns: 750
            })
        );
        assert_eq!(
            ClocklessTiming::from_ns(250, 625, 375, 0),
            Err(ConfigError::ZeroTickRate)
        );
        assert_eq!(
            ClocklessTiming::from_ns(250, 0, 375, 80_000_000),
            Err(ConfigError::ZeroPhase)
        );
    }

    #[test]
    fn test_chipset_table() {
        for chipset in ClocklessChipset::ALL {
            let timing = chipset.timing(80_000_000);
            assert!(timing.is_ok(), "{}", chipset.name());
        }
        assert_eq!(ClocklessChipset::Ws2812.timing_ns(), (250, 625, 375));
        assert_eq!(ClocklessChipset::Ws2812.reset().as_micros(), 50);
        assert_eq!(ClocklessChipset::Ws2813.reset().as_micros(), 300);
        assert_eq!(ClocklessChipset::Tm1829.reset().as_micros(), 500);
        assert_eq!(ClocklessChipset::Sk6812.timing_ns(), (300, 300, 600));
        assert_eq!(ClocklessChipset::Sm16703.timing_ns(), (300, 600, 300));
    }

    #[test]
    fn test_chipset_cell_bits() {
        for chipset in ClocklessChipset::ALL {
            let padded = matches!(
                chipset,
                ClocklessChipset::Ge8822 | ClocklessChipset::Lpd1886 | ClocklessChipset::Gw6205
            );
            assert_eq!(chipset.cell_bits(), if padded { 12 } else { 8 }, "{}", chipset.name());
            assert_eq!(chipset.inverted(), chipset == ClocklessChipset::Tm1829);
        }
    }

    #[test]
    fn test_clockless_extra_bits() {
        let leds = [Rgb::new(0xFF, 0x00, 0x81)];
        let writer = Clockless::new(
            RecordingEngine::default(),
            ClocklessConfig::new(ClocklessChipset::Ge8822),
        );
        let mut device = Controller::<_>::new(writer, ColorOrder::Rgb).with_leds(&leds);
        device.set_dither(DitherMode::Disabled);
        assert_eq!(device.show(255), Ok(()));
        assert_eq!(device.writer().engine().bytes, [0xFF, 0x00, 0x81]);
        assert_eq!(device.writer().engine().widths, [12, 12, 12]);

        let chipset = ClocklessChipset::Ge8822;
        let engine = chipset
            .pulse_engine(RecordingLine::default(), 80_000_000)
            .unwrap();
        let t1 = engine.timing().t1();
        let writer = Clockless::new(engine, ClocklessConfig::new(chipset));
        let mut device = Controller::<_>::new(writer, ColorOrder::Rgb).with_leds(&leds);
        device.set_dither(DitherMode::Disabled);
        assert_eq!(device.show(255), Ok(()));

        let mut expected = Vec::new();
        for byte in [0xFF, 0x00, 0x81] {
            expected.extend(to_bits(&[byte]));
            expected.extend([false; 4]);
        }
        let line = device.writer().engine().line();
        assert_eq!(line.bits(t1), expected);
        assert_eq!(line.now, 36 * engine_period(chipset));
    }

    #[test]
    fn test_inverted_bit_cell_edges() {
        let timing = ClocklessTiming::from_ticks(2, 5, 3);
        let mut engine =
            PulseEngine::new(RecordingLine::default(), timing).with_inverted(true);
        engine.write_cell(0);
        engine.write_cell(1);
        engine.release();

        assert_eq!(
            engine.into_line().edges,
            [
                (0, Edge::Low(1)),
                (2, Edge::High(1)),
                (10, Edge::Low(1)),
                (17, Edge::High(1)),
                (20, Edge::High(1)),
            ]
        );

        let tm1829 = ClocklessChipset::Tm1829
            .pulse_engine(RecordingLine::default(), 80_000_000)
            .unwrap();
        assert!(tm1829.is_inverted());
        let ws2812 = ClocklessChipset::Ws2812
            .pulse_engine(RecordingLine::default(), 80_000_000)
            .unwrap();
        assert!(!ws2812.is_inverted());
    }

    #[test]
    fn test_inverted_frame_idles_high() {
        let chipset = ClocklessChipset::Tm1829;
        let engine = chipset
            .pulse_engine(RecordingLine::default(), 80_000_000)
            .unwrap();
        let writer = Clockless::new(engine, ClocklessConfig::new(chipset));
        let leds = [Rgb::new(1, 2, 3)];
        let mut device = Controller::<_>::new(writer, ColorOrder::Rgb).with_leds(&leds);
        device.set_dither(DitherMode::Disabled);
        assert_eq!(device.show(255), Ok(()));

        let edges = &device.writer().engine().line().edges;
        assert_eq!(edges.first().map(|&(_, edge)| edge), Some(Edge::High(1)));
        assert_eq!(edges.get(1).map(|&(_, edge)| edge), Some(Edge::Low(1)));
        assert_eq!(edges.last().map(|&(_, edge)| edge), Some(Edge::High(1)));
    }

    #[test]
    fn test_clockless_frame_bytes() {
        let leds = [Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)];
        let writer = Clockless::new(
            RecordingEngine::default(),
            ClocklessConfig::new(ClocklessChipset::Ws2812),
        );
        let mut device = Controller::<_>::new(writer, ColorOrder::Grb).with_leds(&leds);
        device.set_dither(DitherMode::Disabled);
        assert_eq!(device.chipset(), "WS2812");

        assert_eq!(device.show(255), Ok(()));
        let engine = device.writer().engine();
        assert_eq!(engine.bytes, [2, 1, 3, 5, 4, 6]);
        assert_eq!(engine.frames, 1);
        assert!(!engine.open);
    }

    #[test]
    fn test_clockless_empty_frame() {
        let writer = Clockless::new(
            RecordingEngine::default(),
            ClocklessConfig::new(ClocklessChipset::Sk6812),
        );
        let mut device = Controller::<_>::new(writer, ColorOrder::Grb);
        assert_eq!(device.show(255), Ok(()));
        assert!(device.writer().engine().bytes.is_empty());
        assert_eq!(device.writer().engine().frames, 1);
    }

    #[test]
    fn test_clockless_white_channel() {
        assert_eq!(extract_white([10, 20, 30]), ([0, 10, 20], 10));
        assert_eq!(extract_white([0, 20, 30]), ([0, 20, 30], 0));

        let leds = [Rgb::new(10, 20, 30), Rgb::new(255, 255, 255)];
        let writer = Clockless::new(
            RecordingEngine::default(),
            ClocklessConfig::new(ClocklessChipset::Sk6812).with_white(),
        );
        let mut device = Controller::<_>::new(writer, ColorOrder::Rgb).with_leds(&leds);
        device.set_dither(DitherMode::Disabled);
        assert_eq!(device.show(255), Ok(()));
        assert_eq!(
            device.writer().engine().bytes,
            [0, 10, 20, 10, 0, 0, 0, 255]
        );
    }

    #[test]
    fn test_clockless_over_pulse_engine() {
        let chipset = ClocklessChipset::Ws2812;
        let engine = chipset
            .pulse_engine(RecordingLine::default(), 80_000_000)
            .unwrap();
        let t1 = engine.timing().t1();
        let leds = [Rgb::new(0x80, 0x01, 0xA5)];
        let writer = Clockless::new(engine, ClocklessConfig::new(chipset));
        let mut device = Controller::<_>::new(writer, ColorOrder::Rgb).with_leds(&leds);
        device.set_dither(DitherMode::Disabled);
        assert_eq!(device.show(255), Ok(()));

        let line = device.writer().engine().line();
        assert_eq!(line.bits(t1), to_bits(&[0x80, 0x01, 0xA5]));
        assert_eq!(line.now, 24 * engine_period(chipset));
        assert_eq!(device.writer().engine().phase(), BitCell::Idle);
    }

    fn engine_period(chipset: ClocklessChipset) -> u32 {
        chipset.timing(80_000_000).unwrap().period()
    }

    fn dither_leds() -> [Rgb; 4] {
        [
            Rgb::new(130, 7, 200),
            Rgb::new(0, 255, 64),
            Rgb::new(33, 33, 33),
            Rgb::new(1, 2, 3),
        ]
    }

    #[test]
    fn test_clockless_dithered_frame() {
        let leds = dither_leds();
        let scale = Rgb::new(100, 100, 100);
        let mut frames = Vec::new();
        for frame in 0..8 {
            let mut pixels = PixelController::<1>::new(
                &leds,
                ColorOrder::Grb,
                scale,
                DitherMode::Binary,
            )
            .with_dither_frame(frame);
            let mut reference = pixels.clone();

            let mut writer = Clockless::new(
                RecordingEngine::default(),
                ClocklessConfig::new(ClocklessChipset::Ws2812),
            );
            writer.write_pixels(&mut pixels);

            let mut expected = Vec::new();
            while reference.has(1) {
                reference.step_dithering();
                expected.extend(reference.load_and_scale_rgb());
                reference.advance_data();
            }
            assert_eq!(writer.engine().bytes, expected, "frame {frame}");
            assert_eq!(expected[4], 0);
            frames.push(expected);
        }
        frames.dedup();
        assert!(frames.len() > 1);
    }

    #[test]
    fn test_clockless_white_dithered_frame() {
        let leds = dither_leds();
        for frame in 0..8 {
            let mut pixels = PixelController::<1>::new(
                &leds,
                ColorOrder::Rgb,
                Rgb::new(100, 100, 100),
                DitherMode::Binary,
            )
            .with_dither_frame(frame);
            let mut reference = pixels.clone();

            let mut writer = Clockless::new(
                RecordingEngine::default(),
                ClocklessConfig::new(ClocklessChipset::Sk6812).with_white(),
            );
            writer.write_pixels(&mut pixels);

            let mut expected = Vec::new();
            while reference.has(1) {
                reference.step_dithering();
                let (colors, white) = extract_white(reference.load_and_scale_rgb());
                expected.extend(colors);
                expected.push(white);
                reference.advance_data();
            }
            assert_eq!(writer.engine().bytes, expected, "frame {frame}");
        }
    }

    #[test]
    fn test_parallel_dithered_frame() {
        let leds = dither_leds();
        for frame in 0..8 {
            let mut pixels = PixelController::<2>::new(
                &leds,
                ColorOrder::Rgb,
                Rgb::new(100, 100, 100),
                DitherMode::Binary,
            )
            .with_dither_frame(frame);
            let mut reference = pixels.clone();

            let mut writer =
                ParallelClockless::<_, 2>::new(RecordingLanes::default(), ClocklessChipset::Ws2812);
            writer.write_pixels(&mut pixels);

            let mut expected = Vec::new();
            while reference.has(1) {
                reference.step_dithering();
                for slot in 0..3 {
                    expected.push([
                        reference.load_and_scale_lane(0, slot),
                        reference.load_and_scale_lane(1, slot),
                    ]);
                }
                reference.advance_data();
            }
            assert_eq!(writer.engine().cells, expected, "frame {frame}");
        }
    }

    #[test]
    fn test_parallel_lanes() {
        let leds = [
            Rgb::new(1, 2, 3),
            Rgb::new(4, 5, 6),
            Rgb::new(7, 8, 9),
            Rgb::new(10, 11, 12),
        ];
        let writer = ParallelClockless::<_, 2>::new(RecordingLanes::default(), ClocklessChipset::Ws2812);
        assert_eq!(writer.lane_mask(), 0b11);
        let mut device = Controller::<_, 2>::new(writer, ColorOrder::Rgb).with_leds(&leds);
        device.set_dither(DitherMode::Disabled);
        assert_eq!(device.size(), 2);
        assert_eq!(device.show(255), Ok(()));
        assert_eq!(
            device.writer().engine().cells,
            [[1, 7], [2, 8], [3, 9], [4, 10], [5, 11], [6, 12]]
        );
    }

    #[test]
    fn test_parallel_lane_mask() {
        let leds = [Rgb::new(1, 2, 3), Rgb::new(7, 8, 9)];
        let writer = ParallelClockless::<_, 2>::new(RecordingLanes::default(), ClocklessChipset::Ws2812)
            .with_lane_mask(0b01);
        let mut device = Controller::<_, 2>::new(writer, ColorOrder::Rgb).with_leds(&leds);
        device.set_dither(DitherMode::Disabled);
        assert_eq!(device.show(255), Ok(()));
        assert_eq!(device.writer().engine().cells, [[1, 0], [2, 0], [3, 0]]);
    }
}
